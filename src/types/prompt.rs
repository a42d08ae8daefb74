//! Wire-level prompt types sent to the stream adapter.
//!
//! Distinct from the persisted [`Message`]: continuation stages carry
//! structured tool-call and tool-result entries that are never stored.

use serde::{Deserialize, Serialize};

use super::conversation::{Message, Role};

/// Role on the provider wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool call announced by the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Provider-assigned call identifier.
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// A single part of prompt message content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ToolCall(ToolCall),
    ToolResult {
        call_id: String,
        output: serde_json::Value,
        is_error: bool,
    },
}

/// One entry in the history sent with a generation call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub parts: Vec<ContentPart>,
}

impl PromptMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            parts: vec![ContentPart::Text { text: text.into() }],
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: PromptRole::Assistant,
            parts: vec![ContentPart::Text { text: text.into() }],
        }
    }

    /// Assistant stage output carrying its announced tool calls.
    pub fn assistant_with_calls(text: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        let text = text.into();
        let mut parts = Vec::with_capacity(calls.len() + 1);
        if !text.is_empty() {
            parts.push(ContentPart::Text { text });
        }
        parts.extend(calls.into_iter().map(ContentPart::ToolCall));
        Self {
            role: PromptRole::Assistant,
            parts,
        }
    }

    /// One tool-result entry, matched to its call by id.
    pub fn tool_result(
        call_id: impl Into<String>,
        output: serde_json::Value,
        is_error: bool,
    ) -> Self {
        Self {
            role: PromptRole::Tool,
            parts: vec![ContentPart::ToolResult {
                call_id: call_id.into(),
                output,
                is_error,
            }],
        }
    }

    /// Map a persisted message into its wire form (text content only; tool
    /// plumbing of past turns is not replayed).
    pub fn from_stored(message: &Message) -> Self {
        let role = match message.role {
            Role::User => PromptRole::User,
            Role::Assistant => PromptRole::Assistant,
            Role::System => PromptRole::System,
        };
        Self {
            role,
            parts: vec![ContentPart::Text {
                text: message.content.clone(),
            }],
        }
    }

    /// Concatenated text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Tool calls carried by this message.
    pub fn tool_calls(&self) -> Vec<&ToolCall> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::ToolCall(call) => Some(call),
                _ => None,
            })
            .collect()
    }
}
