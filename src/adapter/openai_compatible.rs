//! OpenAI-compatible chat-completions stream adapter.
//!
//! Translates the provider's SSE framing into [`AdapterEvent`]s. Streamed
//! tool-call fragments are accumulated by choice index and each assembled
//! call is announced exactly once, after the text of the stage, in provider
//! order.

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::AgentError;
use crate::types::{AdapterEvent, ContentPart, PromptMessage, PromptRole, ToolCall};
use crate::util::retry::RetryPolicy;

use super::http::{bearer_headers, parse_sse_data, shared_client, status_to_error};
use super::{AdapterStream, GenerationRequest, LlmStreamAdapter};

pub struct OpenAiCompatibleAdapter {
    config: LlmConfig,
    retry: RetryPolicy,
}

impl OpenAiCompatibleAdapter {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn build_request_body(&self, request: &GenerationRequest) -> serde_json::Value {
        let mut messages = vec![serde_json::json!({
            "role": "system",
            "content": request.system_prompt,
        })];
        messages.extend(request.messages.iter().map(prompt_message_to_wire));

        let mut body = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "stream": true,
        });

        if !request.tools.is_empty() {
            let tools: Vec<serde_json::Value> = request
                .tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        }
                    })
                })
                .collect();
            body.as_object_mut()
                .unwrap()
                .insert("tools".into(), tools.into());
        }

        body
    }
}

#[async_trait]
impl LlmStreamAdapter for OpenAiCompatibleAdapter {
    async fn open(&self, request: GenerationRequest) -> Result<AdapterStream, AgentError> {
        let body = self.build_request_body(&request);
        let url = format!("{}/chat/completions", self.config.base_url);

        debug!(
            model = %self.config.model,
            tools = request.tools.len(),
            "opening chat completions stream"
        );

        // Retries cover connection establishment only, never a live stream.
        let resp = self
            .retry
            .execute(|| async {
                let resp = shared_client()
                    .post(&url)
                    .headers(bearer_headers(&self.config.api_key))
                    .json(&body)
                    .send()
                    .await?;

                let status = resp.status().as_u16();
                if status != 200 {
                    let text = resp.text().await.unwrap_or_default();
                    return Err(status_to_error(status, &text));
                }
                Ok(resp)
            })
            .await?;

        let byte_stream = resp.bytes_stream();

        let stream = async_stream::stream! {
            let mut buffer = String::new();
            let mut pending: Vec<PendingCall> = Vec::new();
            let mut failed = false;
            futures::pin_mut!(byte_stream);

            while let Some(chunk) = byte_stream.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(AgentError::Network(e));
                        failed = true;
                        break;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim().to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    if line.is_empty() || line.starts_with(':') {
                        continue;
                    }

                    if let Some(data) = parse_sse_data(&line) {
                        match serde_json::from_str::<ChatStreamChunk>(data) {
                            Ok(parsed) => {
                                if let Some(choice) = parsed.choices.into_iter().next() {
                                    if let Some(content) = choice.delta.content {
                                        if !content.is_empty() {
                                            yield Ok(AdapterEvent::TextDelta { text: content });
                                        }
                                    }
                                    for delta in choice.delta.tool_calls.unwrap_or_default() {
                                        accumulate(&mut pending, delta);
                                    }
                                }
                            }
                            Err(_) => {} // skip unparseable frames
                        }
                    }
                }
            }

            if !failed {
                // Announce each assembled call exactly once, in provider order.
                for call in pending {
                    yield Ok(AdapterEvent::ToolCallAnnounced { call: call.into_tool_call() });
                }
                yield Ok(AdapterEvent::TurnComplete);
            }
        };

        Ok(Box::pin(stream))
    }
}

fn prompt_message_to_wire(message: &PromptMessage) -> serde_json::Value {
    match message.role {
        PromptRole::System => serde_json::json!({ "role": "system", "content": message.text() }),
        PromptRole::User => serde_json::json!({ "role": "user", "content": message.text() }),
        PromptRole::Tool => {
            if let Some(ContentPart::ToolResult { call_id, output, .. }) = message.parts.first() {
                return serde_json::json!({
                    "role": "tool",
                    "tool_call_id": call_id,
                    "content": output.to_string(),
                });
            }
            serde_json::json!({ "role": "tool", "content": message.text() })
        }
        PromptRole::Assistant => {
            let calls = message.tool_calls();
            if calls.is_empty() {
                return serde_json::json!({ "role": "assistant", "content": message.text() });
            }
            let tool_calls: Vec<serde_json::Value> = calls
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "id": c.id,
                        "type": "function",
                        "function": {
                            "name": c.name,
                            "arguments": c.arguments.to_string(),
                        }
                    })
                })
                .collect();
            let text = message.text();
            serde_json::json!({
                "role": "assistant",
                "content": if text.is_empty() {
                    serde_json::Value::Null
                } else {
                    serde_json::Value::String(text)
                },
                "tool_calls": tool_calls,
            })
        }
    }
}

/// Tool call being assembled from streamed fragments.
#[derive(Default)]
struct PendingCall {
    id: String,
    name: String,
    arguments: String,
}

impl PendingCall {
    fn into_tool_call(self) -> ToolCall {
        let arguments = if self.arguments.trim().is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_str(&self.arguments)
                .unwrap_or(serde_json::Value::String(self.arguments))
        };
        ToolCall {
            id: self.id,
            name: self.name,
            arguments,
        }
    }
}

fn accumulate(pending: &mut Vec<PendingCall>, delta: ToolCallDelta) {
    let index = delta
        .index
        .unwrap_or_else(|| pending.len().saturating_sub(1));
    while pending.len() <= index {
        pending.push(PendingCall::default());
    }
    let slot = &mut pending[index];
    if let Some(id) = delta.id {
        slot.id = id;
    }
    if let Some(function) = delta.function {
        if let Some(name) = function.name {
            slot.name.push_str(&name);
        }
        if let Some(arguments) = function.arguments {
            slot.arguments.push_str(&arguments);
        }
    }
}

// Chat-completions stream frame types (internal)

#[derive(Deserialize)]
struct ChatStreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Deserialize, Default)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallDelta>>,
}

#[derive(Deserialize)]
struct ToolCallDelta {
    #[serde(default)]
    index: Option<usize>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<FunctionDelta>,
}

#[derive(Deserialize)]
struct FunctionDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}
