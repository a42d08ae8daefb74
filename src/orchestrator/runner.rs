//! The staged turn state machine.
//!
//! One turn moves through resolve → generate(stage) → execute-tools(stage) →
//! generate(stage+1) → … → persist → complete, with an error path reachable
//! from every step. Text is forwarded to the sink the moment the provider
//! emits it; announced tool calls are buffered and executed between stages
//! so text emission is never interrupted.

use std::sync::Arc;

use futures::StreamExt;
use tokio::time;
use tracing::{debug, warn};

use crate::adapter::{GenerationRequest, LlmStreamAdapter};
use crate::error::AgentError;
use crate::prompt;
use crate::sink::ChunkSink;
use crate::store::ConversationStore;
use crate::tools::{ToolExecutionContext, ToolRegistry, ToolSchema};
use crate::types::{
    AdapterEvent, ConversationId, Message, PromptMessage, StreamChunk, ToolCall, ToolExecution,
};

use super::execution::run_tool;
use super::locks::TurnLocks;
use super::types::{OrchestratorConfig, TurnOutcome, TurnRequest, TurnSuccess};

/// Drives one conversational turn end to end: resolve the conversation, run
/// bounded generation/tool stages, persist the finished turn, and emit the
/// normalized chunk stream.
pub struct Orchestrator {
    store: Arc<dyn ConversationStore>,
    registry: Arc<dyn ToolRegistry>,
    adapter: Arc<dyn LlmStreamAdapter>,
    config: OrchestratorConfig,
    locks: TurnLocks,
}

/// Why a turn stopped before reaching the complete chunk.
enum StageAbort {
    /// The sink disconnected; there is nobody left to stream to.
    Canceled,
    Failed {
        conversation_id: Option<ConversationId>,
        error: AgentError,
    },
}

impl StageAbort {
    fn failed(conversation_id: Option<ConversationId>, error: AgentError) -> Self {
        Self::Failed {
            conversation_id,
            error,
        }
    }
}

/// Output of one generation stage.
struct StageOutput {
    text: String,
    tool_calls: Vec<ToolCall>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        registry: Arc<dyn ToolRegistry>,
        adapter: Arc<dyn LlmStreamAdapter>,
    ) -> Self {
        Self {
            store,
            registry,
            adapter,
            config: OrchestratorConfig::default(),
            locks: TurnLocks::default(),
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Run one turn.
    ///
    /// Never surfaces an unhandled error: every failure is converted into a
    /// terminal `error` chunk and a [`TurnOutcome::Failed`]. The outcome
    /// mirrors the terminal chunk the sink received.
    pub async fn run(&self, request: TurnRequest, sink: &dyn ChunkSink) -> TurnOutcome {
        match self.run_turn(&request, sink).await {
            Ok(outcome) => outcome,
            Err(StageAbort::Canceled) => {
                debug!("chunk sink closed, turn abandoned");
                TurnOutcome::Canceled
            }
            Err(StageAbort::Failed {
                conversation_id,
                error,
            }) => {
                warn!(error = %error, "turn failed");
                let _ = sink
                    .send(StreamChunk::Error {
                        conversation_id,
                        code: error.code(),
                        message: error.to_string(),
                    })
                    .await;
                TurnOutcome::Failed(error)
            }
        }
    }

    async fn run_turn(
        &self,
        request: &TurnRequest,
        sink: &dyn ChunkSink,
    ) -> Result<TurnOutcome, StageAbort> {
        let caller = request
            .caller
            .clone()
            .ok_or_else(|| StageAbort::failed(None, AgentError::AuthenticationMissing))?;

        // Resolve the conversation. This step never talks to the adapter.
        // The per-conversation guard is held from here through persistence
        // so racing turns for the same conversation serialize.
        let (conversation, _turn_guard) = match request.conversation_id {
            Some(id) => {
                let guard = self.locks.acquire(id).await;
                let conversation = self
                    .store
                    .load(id, caller.user_id)
                    .await
                    .map_err(|e| StageAbort::failed(Some(id), e))?
                    .ok_or_else(|| {
                        StageAbort::failed(Some(id), AgentError::ConversationNotFound(id))
                    })?;
                (conversation, guard)
            }
            None => {
                let conversation = self
                    .store
                    .create(caller.user_id, serde_json::Map::new())
                    .await
                    .map_err(|e| {
                        StageAbort::failed(
                            None,
                            AgentError::ConversationCreateFailed(e.to_string()),
                        )
                    })?;
                let guard = self.locks.acquire(conversation.id).await;
                (conversation, guard)
            }
        };

        let conversation_id = conversation.id;
        let expected_updated_at = conversation.updated_at;
        debug!(conversation = %conversation_id, "turn start");

        // Prior turns plus the new user text.
        let mut history: Vec<PromptMessage> = conversation
            .messages
            .iter()
            .map(PromptMessage::from_stored)
            .collect();
        history.push(PromptMessage::user(request.user_text.clone()));

        let tool_schemas = self.registry.tool_schemas();
        // Regenerated on every run so schema changes are always reflected.
        let system_prompt = prompt::assemble(&tool_schemas);

        let tool_ctx = ToolExecutionContext {
            conversation_id,
            user_id: caller.user_id,
            auth_token: caller.auth_token.clone(),
        };

        let mut turn_text = String::new();
        let mut executions: Vec<ToolExecution> = Vec::new();

        // The staging loop. Stages up to `max_continuation_rounds`
        // continuations may solicit tools; the next stage offers no schemas,
        // so the turn terminates even if the model keeps requesting tools.
        let mut stage = 0usize;
        loop {
            let solicit_tools = stage <= self.config.max_continuation_rounds;
            let offered = if solicit_tools {
                tool_schemas.clone()
            } else {
                Vec::new()
            };

            let output = self
                .run_stage(conversation_id, &history, offered, &system_prompt, sink, &mut turn_text)
                .await?;

            debug!(
                conversation = %conversation_id,
                stage,
                tool_calls = output.tool_calls.len(),
                text_len = turn_text.len(),
                "stage complete"
            );

            if output.tool_calls.is_empty() {
                break;
            }
            if !solicit_tools {
                warn!(
                    conversation = %conversation_id,
                    calls = output.tool_calls.len(),
                    "tool calls announced after solicitation ended, ignoring"
                );
                break;
            }

            history.push(PromptMessage::assistant_with_calls(
                output.text,
                output.tool_calls.clone(),
            ));

            // Sequential, in announced order: result ordering stays
            // deterministic and matches call identifiers exactly.
            for call in &output.tool_calls {
                let execution =
                    run_tool(self.registry.as_ref(), call, &tool_ctx, self.config.tool_timeout)
                        .await;
                history.push(PromptMessage::tool_result(
                    &execution.call_id,
                    execution.result_payload(),
                    execution.is_error(),
                ));
                executions.push(execution);
            }

            stage += 1;
        }

        // Persist exactly the new user message and the single synthesized
        // assistant message.
        let user_message = Message::user(request.user_text.clone());
        let assistant_message = Message::assistant(turn_text, executions.clone());

        let (conversation, persisted) = match self
            .store
            .append_messages(
                conversation_id,
                vec![user_message.clone(), assistant_message.clone()],
                Some(expected_updated_at),
            )
            .await
        {
            Ok(updated) => (updated, true),
            Err(err) => {
                // The caller already saw the streamed content; surface the
                // stale store instead of retracting the turn.
                warn!(
                    conversation = %conversation_id,
                    error = %err,
                    "append failed after generation, conversation left stale"
                );
                let mut local = conversation;
                local.messages.push(user_message);
                local.messages.push(assistant_message.clone());
                (local, false)
            }
        };

        let complete = StreamChunk::Complete {
            conversation_id,
            conversation: conversation.clone(),
            message: assistant_message.clone(),
            tool_executions: executions.clone(),
            persisted,
        };
        // The turn is already persisted (or deliberately not); a consumer
        // that vanished this late does not change the outcome.
        let _ = sink.send(complete).await;

        debug!(
            conversation = %conversation_id,
            executions = executions.len(),
            persisted,
            "turn complete"
        );

        Ok(TurnOutcome::Completed(TurnSuccess {
            conversation,
            message: assistant_message,
            tool_executions: executions,
            persisted,
        }))
    }

    /// Run one generation stage: open an adapter stream, forward text deltas
    /// as `content` chunks, and buffer announced tool calls in provider
    /// order.
    async fn run_stage(
        &self,
        conversation_id: ConversationId,
        history: &[PromptMessage],
        tools: Vec<ToolSchema>,
        system_prompt: &str,
        sink: &dyn ChunkSink,
        turn_text: &mut String,
    ) -> Result<StageOutput, StageAbort> {
        let request = GenerationRequest {
            system_prompt: system_prompt.to_string(),
            messages: history.to_vec(),
            tools,
        };

        let mut stream = self
            .adapter
            .open(request)
            .await
            .map_err(|e| StageAbort::failed(Some(conversation_id), e))?;

        let mut text = String::new();
        let mut tool_calls: Vec<ToolCall> = Vec::new();

        let idle = self.config.generation_idle_timeout;
        let idle_sleep = time::sleep(idle);
        tokio::pin!(idle_sleep);

        loop {
            tokio::select! {
                _ = &mut idle_sleep => {
                    return Err(StageAbort::failed(
                        Some(conversation_id),
                        AgentError::Timeout(idle.as_millis() as u64),
                    ));
                }
                event = stream.next() => {
                    let Some(event) = event else { break; };
                    idle_sleep.as_mut().reset(time::Instant::now() + idle);
                    match event {
                        Ok(AdapterEvent::TextDelta { text: delta }) => {
                            if delta.is_empty() {
                                continue;
                            }
                            text.push_str(&delta);
                            turn_text.push_str(&delta);
                            let chunk = StreamChunk::Content {
                                conversation_id,
                                text: delta,
                            };
                            if sink.send(chunk).await.is_err() {
                                return Err(StageAbort::Canceled);
                            }
                        }
                        Ok(AdapterEvent::ToolCallAnnounced { call }) => {
                            if !tool_calls.iter().any(|c| c.id == call.id) {
                                tool_calls.push(call);
                            }
                        }
                        Ok(AdapterEvent::TurnComplete) => break,
                        Err(err) => {
                            return Err(StageAbort::failed(Some(conversation_id), err));
                        }
                    }
                }
            }
        }

        Ok(StageOutput { text, tool_calls })
    }
}
