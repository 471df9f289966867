use serde_json::Value;

/// The full output envelope, pretty-printed.
pub fn render_json(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}
