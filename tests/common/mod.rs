//! Shared test doubles: scripted adapter, recording sinks, canned tools.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream;

use concierge::adapter::{AdapterStream, GenerationRequest, LlmStreamAdapter};
use concierge::error::AgentError;
use concierge::sink::{ChunkSink, SinkClosed};
use concierge::store::{ConversationStore, InMemoryConversationStore};
use concierge::tools::{ClosureTool, Tool, ToolParameters};
use concierge::types::{AdapterEvent, Conversation, ConversationId, Message, StreamChunk, ToolCall, UserId};

/// Adapter that replays scripted event stages, one per `open` call.
#[derive(Default)]
pub struct ScriptedAdapter {
    stages: Mutex<Vec<Vec<Result<AdapterEvent, AgentError>>>>,
    opened: AtomicUsize,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one stage's events.
    pub fn stage(self, events: Vec<Result<AdapterEvent, AgentError>>) -> Self {
        self.stages.lock().unwrap().push(events);
        self
    }

    /// Queue a stage that emits one text delta and completes.
    pub fn text_stage(self, text: &str) -> Self {
        self.stage(vec![text_delta(text), turn_complete()])
    }

    /// Number of `open` calls made so far.
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Requests captured from every `open` call, in order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmStreamAdapter for ScriptedAdapter {
    async fn open(&self, request: GenerationRequest) -> Result<AdapterStream, AgentError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);

        let mut stages = self.stages.lock().unwrap();
        if stages.is_empty() {
            return Err(AgentError::LlmStream("no scripted stage left".into()));
        }
        Ok(Box::pin(stream::iter(stages.remove(0))))
    }
}

pub fn text_delta(text: &str) -> Result<AdapterEvent, AgentError> {
    Ok(AdapterEvent::TextDelta { text: text.into() })
}

pub fn tool_call_announced(
    id: &str,
    name: &str,
    arguments: serde_json::Value,
) -> Result<AdapterEvent, AgentError> {
    Ok(AdapterEvent::ToolCallAnnounced {
        call: ToolCall {
            id: id.into(),
            name: name.into(),
            arguments,
        },
    })
}

pub fn turn_complete() -> Result<AdapterEvent, AgentError> {
    Ok(AdapterEvent::TurnComplete)
}

/// Sink that records every chunk it is given.
#[derive(Default)]
pub struct CollectingSink {
    chunks: Mutex<Vec<StreamChunk>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunks(&self) -> Vec<StreamChunk> {
        self.chunks.lock().unwrap().clone()
    }

    /// Concatenated text of every `content` chunk, in emission order.
    pub fn content_text(&self) -> String {
        self.chunks()
            .iter()
            .filter_map(|c| match c {
                StreamChunk::Content { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChunkSink for CollectingSink {
    async fn send(&self, chunk: StreamChunk) -> Result<(), SinkClosed> {
        self.chunks.lock().unwrap().push(chunk);
        Ok(())
    }
}

/// Sink that accepts a fixed number of chunks, then reports itself closed.
pub struct LimitedSink {
    remaining: Mutex<usize>,
    chunks: Mutex<Vec<StreamChunk>>,
}

impl LimitedSink {
    pub fn new(limit: usize) -> Self {
        Self {
            remaining: Mutex::new(limit),
            chunks: Mutex::new(Vec::new()),
        }
    }

    pub fn chunks(&self) -> Vec<StreamChunk> {
        self.chunks.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChunkSink for LimitedSink {
    async fn send(&self, chunk: StreamChunk) -> Result<(), SinkClosed> {
        let mut remaining = self.remaining.lock().unwrap();
        if *remaining == 0 {
            return Err(SinkClosed);
        }
        *remaining -= 1;
        self.chunks.lock().unwrap().push(chunk);
        Ok(())
    }
}

/// Store whose append always fails, for degraded-persistence paths.
#[derive(Default)]
pub struct FailingAppendStore {
    inner: InMemoryConversationStore,
}

impl FailingAppendStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for FailingAppendStore {
    async fn load(
        &self,
        id: ConversationId,
        owner: UserId,
    ) -> Result<Option<Conversation>, AgentError> {
        self.inner.load(id, owner).await
    }

    async fn create(
        &self,
        owner: UserId,
        initial_context: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Conversation, AgentError> {
        self.inner.create(owner, initial_context).await
    }

    async fn append_messages(
        &self,
        _id: ConversationId,
        _messages: Vec<Message>,
        _expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<Conversation, AgentError> {
        Err(AgentError::Persistence("database unavailable".into()))
    }
}

/// A tool that always returns the given payload.
pub fn json_tool(name: &str, description: &str, result: serde_json::Value) -> Arc<dyn Tool> {
    Arc::new(ClosureTool::new(
        name,
        description,
        ToolParameters::empty(),
        move |_args, _ctx| {
            let result = result.clone();
            async move { Ok(result) }
        },
    ))
}

/// A tool that always fails with the given message.
pub fn failing_tool(name: &str, message: &'static str) -> Arc<dyn Tool> {
    let tool_name = name.to_string();
    Arc::new(ClosureTool::new(
        name,
        "Always fails",
        ToolParameters::empty(),
        move |_args, _ctx| {
            let tool_name = tool_name.clone();
            async move {
                Err(AgentError::ToolExecution {
                    tool_name,
                    message: message.into(),
                })
            }
        },
    ))
}
