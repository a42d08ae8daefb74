//! LLM stream adapter: one provider call as an ordered event stream.

pub(crate) mod http;
pub mod openai_compatible;

pub use openai_compatible::OpenAiCompatibleAdapter;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::AgentError;
use crate::tools::ToolSchema;
use crate::types::{AdapterEvent, PromptMessage};

/// One streaming generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub messages: Vec<PromptMessage>,
    pub tools: Vec<ToolSchema>,
}

/// Event stream for one provider call.
pub type AdapterStream = BoxStream<'static, Result<AdapterEvent, AgentError>>;

/// Wraps one provider call as an ordered sequence of typed events, hiding
/// provider-specific framing.
///
/// Contract: text deltas are delivered in emission order; a tool call is
/// announced exactly once per provider-side call; [`AdapterEvent::TurnComplete`]
/// is the last event unless the stream yields an error instead. Dropping the
/// stream cancels the upstream call.
#[async_trait]
pub trait LlmStreamAdapter: Send + Sync {
    async fn open(&self, request: GenerationRequest) -> Result<AdapterStream, AgentError>;
}
