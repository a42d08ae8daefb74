//! Chunk sink: the caller-supplied consumer of emitted chunks.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::types::StreamChunk;

/// The consumer went away. The in-flight turn is abandoned and nothing is
/// persisted for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkClosed;

impl std::fmt::Display for SinkClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "chunk sink closed")
    }
}

impl std::error::Error for SinkClosed {}

/// Receives the orchestrator's chunk stream in strict emission order.
///
/// The orchestrator only ever writes to the sink. A slow consumer applies
/// its own buffering or dropping policy; the orchestrator does not pace
/// emission on its behalf.
#[async_trait]
pub trait ChunkSink: Send + Sync {
    async fn send(&self, chunk: StreamChunk) -> Result<(), SinkClosed>;
}

/// Sink backed by a bounded tokio channel.
pub struct ChannelSink {
    tx: mpsc::Sender<StreamChunk>,
}

impl ChannelSink {
    /// Create a sink and its receiving half.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<StreamChunk>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ChunkSink for ChannelSink {
    async fn send(&self, chunk: StreamChunk) -> Result<(), SinkClosed> {
        self.tx.send(chunk).await.map_err(|_| SinkClosed)
    }
}
