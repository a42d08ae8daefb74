//! Tool registry: the execution boundary between orchestrator and tools.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;

use super::tool::{Tool, ToolExecutionContext};
use super::types::ToolSchema;
use super::validation::validate_arguments;

/// Exposes tool schemas for provider requests and executes announced calls.
///
/// Errors from `execute` are tool-scoped: the orchestrator records them on
/// the turn instead of aborting it.
#[async_trait]
pub trait ToolRegistry: Send + Sync {
    fn tool_schemas(&self) -> Vec<ToolSchema>;

    async fn execute(
        &self,
        name: &str,
        arguments: serde_json::Value,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, AgentError>;
}

/// Registry over a fixed set of tools, validating arguments at the boundary.
pub struct StaticToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl StaticToolRegistry {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }
}

#[async_trait]
impl ToolRegistry for StaticToolRegistry {
    fn tool_schemas(&self) -> Vec<ToolSchema> {
        self.tools
            .iter()
            .map(|t| ToolSchema {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters().schema.clone(),
            })
            .collect()
    }

    async fn execute(
        &self,
        name: &str,
        arguments: serde_json::Value,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, AgentError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| AgentError::ToolExecution {
                tool_name: name.to_string(),
                message: format!("tool '{name}' not found"),
            })?;

        if let Err(message) = validate_arguments(&arguments, &tool.parameters().schema) {
            return Err(AgentError::ToolExecution {
                tool_name: name.to_string(),
                message,
            });
        }

        tool.execute(&arguments, ctx).await
    }
}
