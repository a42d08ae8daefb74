//! Normalized chunk stream emitted to the caller.

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

use super::conversation::{Conversation, ConversationId, Message, ToolExecution};

/// One unit of the orchestrator's output stream.
///
/// For a given turn, zero or more `content` chunks are followed by exactly
/// one terminal chunk (`complete` or `error`); nothing is emitted after the
/// terminal one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamChunk {
    /// Incremental assistant text.
    Content {
        conversation_id: ConversationId,
        text: String,
    },
    /// Terminal: the finished turn.
    Complete {
        conversation_id: ConversationId,
        conversation: Conversation,
        message: Message,
        tool_executions: Vec<ToolExecution>,
        /// False when the turn streamed fully but the store append failed;
        /// the conversation is stale until a later append succeeds.
        persisted: bool,
    },
    /// Terminal: the turn failed.
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        conversation_id: Option<ConversationId>,
        code: ErrorCode,
        message: String,
    },
}

impl StreamChunk {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Content { .. })
    }
}
