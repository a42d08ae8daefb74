//! Error types for Concierge.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ConversationId;

/// Primary error type for all orchestrator operations.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("caller identity is required before any step")]
    AuthenticationMissing,

    #[error("conversation {0} not found")]
    ConversationNotFound(ConversationId),

    #[error("failed to create conversation: {0}")]
    ConversationCreateFailed(String),

    #[error("LLM stream error: {0}")]
    LlmStream(String),

    #[error("tool '{tool_name}' failed: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("conversation {0} was modified by a concurrent writer")]
    ConcurrencyConflict(ConversationId),

    #[error("timeout after {0}ms")]
    Timeout(u64),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Code attached to a terminal `error` chunk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    AuthenticationMissing,
    ConversationNotFound,
    ConversationCreateFailed,
    LlmStream,
    Persistence,
    Internal,
}

impl AgentError {
    /// Classify this error for the terminal chunk.
    ///
    /// Provider and transport failures all surface as `LlmStream`: from the
    /// caller's point of view the generation stage is what failed.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::AuthenticationMissing => ErrorCode::AuthenticationMissing,
            Self::ConversationNotFound(_) => ErrorCode::ConversationNotFound,
            Self::ConversationCreateFailed(_) => ErrorCode::ConversationCreateFailed,
            Self::LlmStream(_)
            | Self::Network(_)
            | Self::Api { .. }
            | Self::RateLimited { .. }
            | Self::Timeout(_) => ErrorCode::LlmStream,
            Self::Persistence(_) | Self::ConcurrencyConflict(_) => ErrorCode::Persistence,
            Self::ToolExecution { .. } | Self::Serialization(_) | Self::Configuration(_) => {
                ErrorCode::Internal
            }
        }
    }

    /// Whether this error is potentially retryable at the provider boundary.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_)
                | Self::Timeout(_)
                | Self::RateLimited { .. }
                | Self::Api { status: 500..=599, .. }
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AgentError>;
