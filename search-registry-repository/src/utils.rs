//! Utility functions for the search registry repository.

use serde_json::Value;

/// Human-readable name of a JSON value's type, for type-constraint messages.
///
/// # Example
///
/// ```
/// use search_registry_repository::json_type_name;
/// use serde_json::json;
///
/// assert_eq!(json_type_name(&json!([1, 2])), "array");
/// assert_eq!(json_type_name(&json!(null)), "null");
/// ```
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_type_name() {
        assert_eq!(json_type_name(&json!(true)), "boolean");
        assert_eq!(json_type_name(&json!(1.5)), "number");
        assert_eq!(json_type_name(&json!("x")), "string");
        assert_eq!(json_type_name(&json!({})), "object");
    }
}
