//! Convenience re-exports for embedding callers.

pub use crate::adapter::{GenerationRequest, LlmStreamAdapter, OpenAiCompatibleAdapter};
pub use crate::config::LlmConfig;
pub use crate::error::{AgentError, ErrorCode, Result};
pub use crate::orchestrator::{
    CallerIdentity, Orchestrator, OrchestratorConfig, TurnOutcome, TurnRequest, TurnSuccess,
};
pub use crate::sink::{ChannelSink, ChunkSink, SinkClosed};
pub use crate::store::{ConversationStore, InMemoryConversationStore};
pub use crate::tools::{
    ClosureTool, StaticToolRegistry, Tool, ToolExecutionContext, ToolParameters, ToolRegistry,
    ToolSchema,
};
pub use crate::types::{
    AdapterEvent, Conversation, ConversationId, Message, PromptMessage, Role, StreamChunk,
    ToolCall, ToolExecution, ToolExecutionStatus, UserId,
};
