//! In-memory conversation store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::AgentError;
use crate::types::{Conversation, ConversationId, Message, UserId};

use super::ConversationStore;

/// Reference store keeping conversations in process memory.
///
/// Serves tests and embedding callers; a relational store behind the same
/// trait is the production collaborator.
#[derive(Default)]
pub struct InMemoryConversationStore {
    inner: RwLock<HashMap<ConversationId, Conversation>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a conversation directly.
    pub async fn insert(&self, conversation: Conversation) {
        self.inner
            .write()
            .await
            .insert(conversation.id, conversation);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn load(
        &self,
        id: ConversationId,
        owner: UserId,
    ) -> Result<Option<Conversation>, AgentError> {
        let guard = self.inner.read().await;
        Ok(guard.get(&id).filter(|c| c.user_id == owner).cloned())
    }

    async fn create(
        &self,
        owner: UserId,
        initial_context: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Conversation, AgentError> {
        let conversation = Conversation::new(owner, initial_context);
        self.inner
            .write()
            .await
            .insert(conversation.id, conversation.clone());
        Ok(conversation)
    }

    async fn append_messages(
        &self,
        id: ConversationId,
        messages: Vec<Message>,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<Conversation, AgentError> {
        let mut guard = self.inner.write().await;
        let conversation = guard
            .get_mut(&id)
            .ok_or(AgentError::ConversationNotFound(id))?;

        if let Some(expected) = expected_updated_at {
            if conversation.updated_at != expected {
                return Err(AgentError::ConcurrencyConflict(id));
            }
        }

        conversation.messages.extend(messages);
        conversation.updated_at = Utc::now();
        Ok(conversation.clone())
    }
}
