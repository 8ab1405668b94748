//! Minimal JSON Schema boundary check.
//!
//! Tool input schemas are simple (object + required properties +
//! primitive property types), so this validates the subset the
//! registry boundary actually needs rather than pulling in a general
//! JSON Schema engine for a check the agent loop runs on every call.

use serde_json::Value;

/// Validate `input` against `schema`, checking `required` properties
/// are present and, where a property's schema declares a `type`, that
/// the value's JSON type matches.
///
/// # Errors
///
/// Returns a human-readable message naming the first mismatch found.
pub fn validate_against_schema(schema: &Value, input: &Value) -> Result<(), String> {
    let Some(schema_type) = schema.get("type").and_then(Value::as_str) else {
        return Ok(());
    };
    if schema_type == "object" && !input.is_object() {
        return Err(format!("expected an object, got {}", type_name(input)));
    }

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required {
            let Some(field_name) = field.as_str() else { continue };
            if input.get(field_name).is_none() {
                return Err(format!("missing required field `{field_name}`"));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (name, prop_schema) in properties {
            let Some(value) = input.get(name) else { continue };
            if let Some(expected) = prop_schema.get("type").and_then(Value::as_str) {
                if !matches_type(expected, value) {
                    return Err(format!(
                        "field `{name}` expected {expected}, got {}",
                        type_name(value)
                    ));
                }
            }
        }
    }

    Ok(())
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
