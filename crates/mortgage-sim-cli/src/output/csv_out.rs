use serde_json::{Map, Value};
use std::io::Write;

/// Simulations emit the schedule, one row per month; other results emit
/// field/value pairs.
pub fn render_csv(value: &Value) -> Result<String, Box<dyn std::error::Error>> {
    let mut buf = Vec::new();
    write_csv(value, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

pub fn write_csv<W: Write>(value: &Value, out: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(out);

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => match map.get("schedule") {
            Some(Value::Array(rows)) => write_rows(&mut wtr, rows)?,
            _ => write_fields(&mut wtr, map)?,
        },
        Value::Array(rows) => write_rows(&mut wtr, rows)?,
        other => wtr.write_record([format_csv_value(other)])?,
    }

    wtr.flush()?;
    Ok(())
}

fn write_fields<W: Write>(
    wtr: &mut csv::Writer<W>,
    map: &Map<String, Value>,
) -> Result<(), csv::Error> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in map {
        wtr.write_record([key.as_str(), &format_csv_value(val)])?;
    }
    Ok(())
}

fn write_rows<W: Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> Result<(), csv::Error> {
    let Some(Value::Object(first)) = rows.first() else {
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;

    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                .collect();
            wtr.write_record(&record)?;
        }
    }
    Ok(())
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
