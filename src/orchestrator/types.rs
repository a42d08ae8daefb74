//! Request and result types for running a turn.

use std::time::Duration;

use crate::error::AgentError;
use crate::types::{Conversation, ConversationId, Message, ToolExecution, UserId};

/// Identity of the caller on whose behalf a turn runs.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub user_id: UserId,
    /// Token forwarded to tools for delegated calls.
    pub auth_token: Option<String>,
}

impl CallerIdentity {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            auth_token: None,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

/// Request to run one turn.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    /// Existing conversation to continue; a new one is created when absent.
    pub conversation_id: Option<ConversationId>,
    pub user_text: String,
    /// Required before any step; an unauthenticated session fails the turn.
    pub caller: Option<CallerIdentity>,
}

impl TurnRequest {
    pub fn new(user_text: impl Into<String>) -> Self {
        Self {
            conversation_id: None,
            user_text: user_text.into(),
            caller: None,
        }
    }

    pub fn with_conversation(mut self, id: ConversationId) -> Self {
        self.conversation_id = Some(id);
        self
    }

    pub fn with_caller(mut self, caller: CallerIdentity) -> Self {
        self.caller = Some(caller);
        self
    }
}

/// Tunables for the staged protocol.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Continuation rounds that may still solicit tools. If the model keeps
    /// requesting tools past the bound, one final synthesis call without
    /// tool schemas follows, so a turn always terminates.
    pub max_continuation_rounds: usize,
    /// Independent timeout for each tool execution.
    pub tool_timeout: Duration,
    /// Idle timeout between adapter events within one generation stage.
    pub generation_idle_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_continuation_rounds: 2,
            tool_timeout: Duration::from_secs(30),
            generation_idle_timeout: Duration::from_secs(120),
        }
    }
}

impl OrchestratorConfig {
    pub fn with_max_continuation_rounds(mut self, rounds: usize) -> Self {
        self.max_continuation_rounds = rounds;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn with_generation_idle_timeout(mut self, timeout: Duration) -> Self {
        self.generation_idle_timeout = timeout;
        self
    }
}

/// Final result of a turn; mirrors the terminal chunk.
#[derive(Debug)]
pub enum TurnOutcome {
    Completed(TurnSuccess),
    /// The turn failed; the terminal `error` chunk was already emitted.
    Failed(AgentError),
    /// The sink disconnected mid-turn; nothing was persisted.
    Canceled,
}

impl TurnOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// A finished turn.
#[derive(Debug, Clone)]
pub struct TurnSuccess {
    pub conversation: Conversation,
    pub message: Message,
    pub tool_executions: Vec<ToolExecution>,
    /// False when generation succeeded but the store append failed.
    pub persisted: bool,
}
