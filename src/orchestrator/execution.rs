//! Tool execution wrapper: bounded timeout, duration capture, error
//! normalization.

use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::debug;

use crate::error::AgentError;
use crate::tools::{ToolExecutionContext, ToolRegistry};
use crate::types::{ToolCall, ToolExecution, ToolExecutionStatus};
use crate::util::timeout::with_timeout;

/// Run one announced call against the registry.
///
/// Never fails the turn: timeouts and tool errors come back as records with
/// `status: Error` and the failure message inline.
pub(crate) async fn run_tool(
    registry: &dyn ToolRegistry,
    call: &ToolCall,
    ctx: &ToolExecutionContext,
    timeout: Duration,
) -> ToolExecution {
    let started = Instant::now();
    let outcome = with_timeout(
        timeout,
        registry.execute(&call.name, call.arguments.clone(), ctx),
    )
    .await;
    let duration_ms = started.elapsed().as_millis() as u64;

    let execution = match outcome {
        Ok(result) => ToolExecution {
            call_id: call.id.clone(),
            tool_name: call.name.clone(),
            arguments: call.arguments.clone(),
            result: Some(result),
            error: None,
            status: ToolExecutionStatus::Success,
            duration_ms,
            executed_at: Utc::now(),
        },
        Err(err) => ToolExecution {
            call_id: call.id.clone(),
            tool_name: call.name.clone(),
            arguments: call.arguments.clone(),
            result: None,
            error: Some(failure_message(err)),
            status: ToolExecutionStatus::Error,
            duration_ms,
            executed_at: Utc::now(),
        },
    };

    debug!(
        tool = %execution.tool_name,
        call_id = %execution.call_id,
        status = %execution.status,
        duration_ms = execution.duration_ms,
        "tool executed"
    );
    execution
}

/// The message recorded on the execution and fed back to the model.
fn failure_message(err: AgentError) -> String {
    match err {
        AgentError::ToolExecution { message, .. } => message,
        AgentError::Timeout(ms) => format!("tool execution timed out after {ms}ms"),
        other => other.to_string(),
    }
}
