//! Conversation store: the durable keyed record of conversations.

pub mod memory;

pub use memory::InMemoryConversationStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AgentError;
use crate::types::{Conversation, ConversationId, Message, UserId};

/// Durable keyed store of conversations.
///
/// `load` returns `Ok(None)` both for an unknown id and for an id owned by a
/// different user, so callers cannot probe for conversations they do not
/// own.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn load(
        &self,
        id: ConversationId,
        owner: UserId,
    ) -> Result<Option<Conversation>, AgentError>;

    async fn create(
        &self,
        owner: UserId,
        initial_context: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Conversation, AgentError>;

    /// Append messages in order and bump `updated_at`.
    ///
    /// When `expected_updated_at` is given and does not match the stored
    /// value, fails with [`AgentError::ConcurrencyConflict`] and appends
    /// nothing.
    async fn append_messages(
        &self,
        id: ConversationId,
        messages: Vec<Message>,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<Conversation, AgentError>;
}
