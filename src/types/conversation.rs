//! Conversation domain entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ConversationId = Uuid;
pub type UserId = Uuid;

/// Role of a persisted message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Outcome of a single tool execution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolExecutionStatus {
    Success,
    Error,
}

/// Record of one tool call performed while producing an assistant message.
///
/// Exactly one record exists per call announced by the provider across the
/// whole turn, matched by the provider-assigned `call_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolExecution {
    pub call_id: String,
    pub tool_name: String,
    /// Arguments supplied by the model.
    pub arguments: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub status: ToolExecutionStatus,
    pub duration_ms: u64,
    pub executed_at: DateTime<Utc>,
}

impl ToolExecution {
    pub fn is_error(&self) -> bool {
        matches!(self.status, ToolExecutionStatus::Error)
    }

    /// Payload fed back to the model as this call's result in a
    /// continuation stage.
    pub fn result_payload(&self) -> serde_json::Value {
        match (&self.result, &self.error) {
            (Some(value), _) => value.clone(),
            (None, Some(message)) => serde_json::json!({ "error": message }),
            (None, None) => serde_json::Value::Null,
        }
    }
}

/// A message in a persisted conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    /// Fully assembled text for the turn; for an assistant message, the
    /// concatenation of every text segment across all stages, in emission
    /// order.
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Tool executions performed while producing this message (assistant
    /// messages only; empty if none).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_executions: Vec<ToolExecution>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            tool_executions: Vec::new(),
        }
    }

    pub fn assistant(content: impl Into<String>, tool_executions: Vec<ToolExecution>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            tool_executions,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            timestamp: Utc::now(),
            tool_executions: Vec::new(),
        }
    }
}

/// A durable conversation: an append-only message sequence plus a free-form
/// context map carried across turns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    pub id: ConversationId,
    pub user_id: UserId,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub context: serde_json::Map<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(user_id: UserId, context: serde_json::Map<String, serde_json::Value>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            messages: Vec::new(),
            context,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn execution_status_serializes_screaming() {
        assert_eq!(
            serde_json::to_string(&ToolExecutionStatus::Success).unwrap(),
            "\"SUCCESS\""
        );
        assert_eq!(ToolExecutionStatus::Error.to_string(), "ERROR");
    }

    #[test]
    fn failed_execution_produces_error_payload() {
        let execution = ToolExecution {
            call_id: "call_1".into(),
            tool_name: "search_deals".into(),
            arguments: serde_json::json!({}),
            result: None,
            error: Some("DB timeout".into()),
            status: ToolExecutionStatus::Error,
            duration_ms: 12,
            executed_at: Utc::now(),
        };

        assert!(execution.is_error());
        assert_eq!(execution.result_payload(), serde_json::json!({ "error": "DB timeout" }));
    }
}
