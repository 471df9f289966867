use serde_json::Value;

use super::money_display;

/// Just the key answer: the solved loan field for simulations, the maximum
/// principal for capacity runs.
pub fn render_minimal(value: &Value) -> String {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(params) = result.pointer("/summary/parameters") {
        let key = params
            .get("solved_for")
            .and_then(Value::as_str)
            .map(parameter_key)
            .unwrap_or("monthly_payment");
        if let Some(val) = params.get(key) {
            return format!("{key}: {}", format_field(key, val));
        }
    }

    let priority_keys = ["max_borrowable_principal", "total_credit_cost"];
    if let Value::Object(map) = result {
        for key in priority_keys {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                return format_field(key, val);
            }
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{key}: {}", format_field(key, val));
        }
    }

    format_minimal(result)
}

/// Map a solved-for tag to the parameter field it fills.
fn parameter_key(solved_for: &str) -> &'static str {
    match solved_for {
        "principal" => "principal",
        "annual_rate" => "annual_rate_percent",
        "duration" => "duration_months",
        _ => "monthly_payment",
    }
}

fn format_field(key: &str, value: &Value) -> String {
    money_display(key, value).unwrap_or_else(|| format_minimal(value))
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
