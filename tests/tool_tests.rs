//! Tests for the tool system and registry boundary.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use concierge::error::AgentError;
use concierge::tools::{
    ClosureTool, StaticToolRegistry, Tool, ToolExecutionContext, ToolParameters, ToolRegistry,
};

fn ctx() -> ToolExecutionContext {
    ToolExecutionContext {
        conversation_id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        auth_token: None,
    }
}

#[test]
fn parameter_builder_constructs_schema() {
    let params = ToolParameters::object()
        .string("stage", "Pipeline stage to filter by", true)
        .number("min_value", "Minimum deal value", false)
        .boolean("include_closed", "Include closed deals", false)
        .build();

    let schema = &params.schema;
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["properties"]["stage"]["type"], "string");
    assert_eq!(schema["properties"]["min_value"]["type"], "number");
    assert_eq!(schema["required"], json!(["stage"]));
}

#[test]
fn parameter_builder_string_enum() {
    let params = ToolParameters::object()
        .string_enum("period", "Reporting period", &["week", "month", "quarter"], true)
        .build();

    let values = params.schema["properties"]["period"]["enum"].as_array().unwrap();
    assert_eq!(values.len(), 3);
}

#[test]
fn empty_parameters_are_an_object_schema() {
    let params = ToolParameters::empty();
    assert_eq!(params.schema["type"], "object");
}

#[tokio::test]
async fn closure_tool_receives_arguments_and_context() {
    let tool = ClosureTool::new(
        "create_task",
        "Create a follow-up task",
        ToolParameters::object()
            .string("title", "Task title", true)
            .build(),
        |arguments, ctx| async move {
            let title = arguments["title"].as_str().unwrap_or_default();
            Ok(json!({
                "title": title,
                "delegated": ctx.auth_token.is_some(),
            }))
        },
    );

    assert_eq!(tool.name(), "create_task");

    let mut context = ctx();
    context.auth_token = Some("tok".into());
    let result = tool
        .execute(&json!({ "title": "Call Acme" }), &context)
        .await
        .unwrap();
    assert_eq!(result["title"], "Call Acme");
    assert_eq!(result["delegated"], true);
}

#[tokio::test]
async fn registry_lists_schemas_for_every_tool() {
    let registry = StaticToolRegistry::new(vec![])
        .with_tool(Arc::new(ClosureTool::new(
            "search_deals",
            "Search open deals",
            ToolParameters::empty(),
            |_a, _c| async move { Ok(json!({})) },
        )))
        .with_tool(Arc::new(ClosureTool::new(
            "score_lead",
            "Score a lead",
            ToolParameters::empty(),
            |_a, _c| async move { Ok(json!({})) },
        )));

    let schemas = registry.tool_schemas();
    let names: Vec<&str> = schemas.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["search_deals", "score_lead"]);
}

#[tokio::test]
async fn registry_rejects_unknown_tool() {
    let registry = StaticToolRegistry::new(vec![]);

    let err = registry
        .execute("imaginary", json!({}), &ctx())
        .await
        .unwrap_err();

    match err {
        AgentError::ToolExecution { tool_name, message } => {
            assert_eq!(tool_name, "imaginary");
            assert!(message.contains("not found"));
        }
        other => panic!("expected tool error, got {other}"),
    }
}

#[tokio::test]
async fn registry_validates_arguments_before_execution() {
    let registry = StaticToolRegistry::new(vec![Arc::new(ClosureTool::new(
        "search_deals",
        "Search open deals",
        ToolParameters::object()
            .string("stage", "Pipeline stage", true)
            .build(),
        |_a, _c| async move { panic!("must not execute on invalid arguments") },
    )) as Arc<dyn Tool>]);

    let err = registry
        .execute("search_deals", json!({}), &ctx())
        .await
        .unwrap_err();

    match err {
        AgentError::ToolExecution { message, .. } => {
            assert!(message.contains("missing required field 'stage'"));
        }
        other => panic!("expected tool error, got {other}"),
    }
}

#[tokio::test]
async fn registry_executes_valid_call() {
    let registry = StaticToolRegistry::new(vec![Arc::new(ClosureTool::new(
        "search_deals",
        "Search open deals",
        ToolParameters::object()
            .string("stage", "Pipeline stage", true)
            .build(),
        |arguments, _c| async move { Ok(json!({ "stage": arguments["stage"], "count": 3 })) },
    )) as Arc<dyn Tool>]);

    let result = registry
        .execute("search_deals", json!({ "stage": "won" }), &ctx())
        .await
        .unwrap();

    assert_eq!(result, json!({ "stage": "won", "count": 3 }));
}
