//! Typed extractors over a task's raw JSON payload.
//!
//! Handlers decode only the fields they need; a missing or mistyped field is
//! always a `TaskError::PayloadDecode` (permanent, no retry) rather than a
//! panic or a silently-defaulted value.

use crate::error::TaskError;

pub fn decode_i64(payload: &serde_json::Value, field: &str) -> Result<i64, TaskError> {
    payload
        .get(field)
        .and_then(serde_json::Value::as_i64)
        .ok_or_else(|| TaskError::PayloadDecode(format!("missing or non-integer field `{field}`")))
}

pub fn decode_str<'a>(payload: &'a serde_json::Value, field: &str) -> Result<&'a str, TaskError> {
    payload
        .get(field)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| TaskError::PayloadDecode(format!("missing or non-string field `{field}`")))
}

/// Some task payloads carry ids that arrived as strings (e.g. forwarded
/// from an external webhook). This coerces either representation to `i64`
/// rather than requiring callers to special-case both at the call site.
pub fn coerce_i64_from_json(value: &serde_json::Value, field: &str) -> Result<i64, TaskError> {
    match value.get(field) {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| TaskError::PayloadDecode(format!("field `{field}` is not an integer"))),
        Some(serde_json::Value::String(s)) => s
            .parse::<i64>()
            .map_err(|_| TaskError::PayloadDecode(format!("field `{field}` is not an integer"))),
        _ => Err(TaskError::PayloadDecode(format!(
            "missing field `{field}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_i64_succeeds_for_integer_field() {
        let payload = json!({ "commit_id": 42 });
        assert_eq!(decode_i64(&payload, "commit_id").unwrap(), 42);
    }

    #[test]
    fn decode_i64_fails_for_missing_field() {
        let payload = json!({});
        assert!(decode_i64(&payload, "commit_id").is_err());
    }

    #[test]
    fn decode_str_succeeds_for_string_field() {
        let payload = json!({ "operation": "enrich.commit_description" });
        assert_eq!(decode_str(&payload, "operation").unwrap(), "enrich.commit_description");
    }

    #[test]
    fn coerce_i64_from_json_accepts_string_or_number() {
        assert_eq!(coerce_i64_from_json(&json!({ "id": 7 }), "id").unwrap(), 7);
        assert_eq!(coerce_i64_from_json(&json!({ "id": "7" }), "id").unwrap(), 7);
        assert!(coerce_i64_from_json(&json!({ "id": "not-a-number" }), "id").is_err());
        assert!(coerce_i64_from_json(&json!({}), "id").is_err());
    }
}
