//! Typed events produced by a stream adapter.

use serde::{Deserialize, Serialize};

use super::prompt::ToolCall;

/// One event in the adapter's ordered stream.
///
/// Text deltas arrive in emission order; each tool call is announced exactly
/// once per provider-side call; `TurnComplete` is the last event unless the
/// stream yields an error instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdapterEvent {
    TextDelta { text: String },
    ToolCallAnnounced { call: ToolCall },
    TurnComplete,
}
