use serde_json::Value;

/// Razorpay error responses look like `{"error": {"code": "BAD_REQUEST_ERROR", "description": "..."}}`.
/// Returns the description if the body has that shape, otherwise the raw body.
pub fn parse_error_description(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            let err = v.get("error")?;
            let code = err.get("code").and_then(Value::as_str).unwrap_or("UNKNOWN");
            let description = err.get("description").and_then(Value::as_str)?;
            Some(format!("{code}: {description}"))
        })
        .unwrap_or_else(|| body.to_string())
}
