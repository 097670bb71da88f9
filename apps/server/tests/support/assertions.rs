use anyhow::Context as _;
use axum::http::StatusCode;
use serde_json::Value;

pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(actual, expected, "unexpected status for {context}");
}

/// Assert a success envelope and return its `data`.
pub fn assert_success(body: &Value) -> anyhow::Result<&Value> {
    assert_eq!(
        body.get("success").and_then(Value::as_bool),
        Some(true),
        "expected success envelope, got {body}"
    );
    body.get("data").context("success envelope has data")
}

/// Assert a failure envelope carrying `code`.
pub fn assert_error_code(body: &Value, code: &str) {
    assert_eq!(
        body.get("success").and_then(Value::as_bool),
        Some(false),
        "expected failure envelope, got {body}"
    );
    assert_eq!(
        body.pointer("/error/code").and_then(Value::as_str),
        Some(code),
        "unexpected error code in {body}"
    );
    assert!(
        body.pointer("/error/message")
            .and_then(Value::as_str)
            .is_some_and(|m| !m.is_empty()),
        "error envelope needs a message: {body}"
    );
}

/// Property ids of a search page, in response order.
pub fn property_ids(data: &Value) -> anyhow::Result<Vec<i64>> {
    data.get("properties")
        .and_then(Value::as_array)
        .context("data.properties is array")?
        .iter()
        .map(|p| p.get("id").and_then(Value::as_i64).context("property id"))
        .collect()
}
