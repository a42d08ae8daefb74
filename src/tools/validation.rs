//! Validate announced tool arguments against the tool's JSON Schema.
//!
//! The model's payloads are untyped on the wire; the registry boundary is
//! where they are checked, so the orchestrator never sees malformed input.

/// Top-level validation: schema type check, required field presence, and
/// property type verification. Returns the first violation found.
pub fn validate_arguments(
    arguments: &serde_json::Value,
    schema: &serde_json::Value,
) -> Result<(), String> {
    if schema.get("type").and_then(|v| v.as_str()) == Some("object") && !arguments.is_object() {
        return Err(format!(
            "expected object arguments, got {}",
            type_name(arguments)
        ));
    }

    let Some(fields) = arguments.as_object() else {
        return Ok(());
    };

    if let Some(required) = schema.get("required").and_then(|v| v.as_array()) {
        for field in required.iter().filter_map(|f| f.as_str()) {
            if !fields.contains_key(field) {
                return Err(format!("missing required field '{field}'"));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(|v| v.as_object()) {
        for (key, value) in fields {
            let Some(expected) = properties
                .get(key)
                .and_then(|p| p.get("type"))
                .and_then(|t| t.as_str())
            else {
                continue;
            };
            if !matches_type(value, expected) {
                return Err(format!(
                    "field '{key}' expected type '{expected}', got {}",
                    type_name(value)
                ));
            }
        }
    }

    Ok(())
}

fn matches_type(value: &serde_json::Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
