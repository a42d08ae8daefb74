//! Tool trait and closure-based tool wrapper.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::types::{ConversationId, UserId};

use super::types::ToolParameters;

/// Context available during tool execution.
#[derive(Debug, Clone)]
pub struct ToolExecutionContext {
    pub conversation_id: ConversationId,
    pub user_id: UserId,
    /// Token forwarded verbatim for any delegated calls the tool makes.
    pub auth_token: Option<String>,
}

/// Core tool trait — implement to expose a business capability to the model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must match what the model calls).
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// JSON Schema parameters.
    fn parameters(&self) -> &ToolParameters;

    /// Execute the tool.
    async fn execute(
        &self,
        arguments: &serde_json::Value,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, AgentError>;
}

/// Type alias for the tool handler function.
type ToolHandler = dyn Fn(
        serde_json::Value,
        ToolExecutionContext,
    ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, AgentError>> + Send>>
    + Send
    + Sync;

/// Closure-based tool for quick tool creation.
pub struct ClosureTool {
    name: String,
    description: String,
    parameters: ToolParameters,
    handler: Arc<ToolHandler>,
}

impl ClosureTool {
    /// Create a tool from a closure.
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: ToolParameters,
        handler: F,
    ) -> Self
    where
        F: Fn(serde_json::Value, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, AgentError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler: Arc::new(move |arguments, ctx| Box::pin(handler(arguments, ctx))),
        }
    }
}

#[async_trait]
impl Tool for ClosureTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        arguments: &serde_json::Value,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, AgentError> {
        (self.handler)(arguments.clone(), ctx.clone()).await
    }
}

impl std::fmt::Debug for ClosureTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}
