use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::money_display;

/// A field/value table for the summary and, for simulations, one row per
/// month of the schedule.
pub fn render_table(value: &Value) -> String {
    let mut sections: Vec<String> = Vec::new();

    let Some(envelope) = value.as_object() else {
        return value.to_string();
    };

    match envelope.get("result") {
        Some(Value::Object(result)) => {
            if let Some(Value::Object(summary)) = result.get("summary") {
                sections.push(field_table(&flatten_summary(summary)));
            } else {
                sections.push(field_table(result));
            }
            if let Some(Value::Array(rows)) = result.get("schedule") {
                sections.push(schedule_table(rows));
            }
        }
        _ => sections.push(field_table(envelope)),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            let lines: Vec<String> = warnings
                .iter()
                .filter_map(Value::as_str)
                .map(|w| format!("  - {w}"))
                .collect();
            sections.push(format!("Warnings:\n{}", lines.join("\n")));
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        sections.push(format!("Methodology: {meth}"));
    }

    sections.join("\n\n")
}

/// Lift the nested `parameters` object next to the totals.
fn flatten_summary(summary: &Map<String, Value>) -> Map<String, Value> {
    let mut flat = Map::new();
    for (key, val) in summary {
        match (key.as_str(), val) {
            ("parameters", Value::Object(params)) => {
                for (k, v) in params {
                    flat.insert(k.clone(), v.clone());
                }
            }
            _ => {
                flat.insert(key.clone(), val.clone());
            }
        }
    }
    flat
}

fn field_table(map: &Map<String, Value>) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_field(key, val)]);
    }
    Table::from(builder).to_string()
}

fn schedule_table(rows: &[Value]) -> String {
    let Some(Value::Object(first)) = rows.first() else {
        return "(empty schedule)".to_string();
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.clone());

    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = headers
                .iter()
                .map(|h| {
                    map.get(h.as_str())
                        .map(|v| format_field(h, v))
                        .unwrap_or_default()
                })
                .collect();
            builder.push_record(record);
        }
    }

    Table::from(builder).to_string()
}

fn format_field(key: &str, value: &Value) -> String {
    money_display(key, value).unwrap_or_else(|| format_value(value))
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simulation_renders_summary_and_schedule() {
        let value = json!({
            "result": {
                "summary": {
                    "parameters": {"principal": "1000", "duration_months": 2},
                    "total_interest": "5.25"
                },
                "schedule": [
                    {"month": 1, "principal": "500", "remaining_balance": "500"},
                    {"month": 2, "principal": "500", "remaining_balance": "0"}
                ]
            },
            "warnings": ["rounded"],
            "methodology": "Constant Annuity"
        });
        let out = render_table(&value);
        assert!(out.contains("duration_months"));
        assert!(out.contains("total_interest"));
        assert!(out.contains("remaining_balance"));
        assert!(out.contains("  - rounded"));
        assert!(out.contains("Methodology: Constant Annuity"));
    }

    #[test]
    fn test_money_fields_show_cents() {
        let value = json!({
            "result": {
                "summary": {
                    "parameters": {"monthly_payment": "1170.2229336940593", "annual_rate_percent": "3.6"},
                    "total_interest": "80853.49"
                },
                "schedule": [
                    {"month": 1, "principal": "570.2229", "remaining_balance": "199429.78"}
                ]
            }
        });
        let out = render_table(&value);
        assert!(out.contains("1170.22"));
        assert!(!out.contains("1170.2229"));
        assert!(out.contains("570.22"));
        assert!(!out.contains("570.2229"));
        assert!(out.contains("3.6"));
    }
}
