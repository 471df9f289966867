pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use mortgage_sim_core::round_money;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::OutputFormat;

/// Fields holding amounts of money. Human-facing renderers show them to the cent.
const MONEY_FIELDS: [&str; 12] = [
    "principal",
    "monthly_payment",
    "interest",
    "insurance",
    "remaining_balance",
    "monthly_insurance",
    "total_interest",
    "total_insurance",
    "total_credit_cost",
    "max_borrowable_principal",
    "amortising_payment",
    "total_repaid",
];

/// Cent-rounded text for a money field; `None` for any other field or a
/// value that is not a decimal.
pub(crate) fn money_display(key: &str, value: &Value) -> Option<String> {
    if !MONEY_FIELDS.contains(&key) {
        return None;
    }
    let amount: Decimal = match value {
        Value::String(s) => s.parse().ok()?,
        Value::Number(n) => n.to_string().parse().ok()?,
        _ => return None,
    };
    Some(format!("{:.2}", round_money(amount)))
}

/// Render a command result in the requested format. The caller prints it.
pub fn render(format: &OutputFormat, value: &Value) -> Result<String, Box<dyn std::error::Error>> {
    let rendered = match format {
        OutputFormat::Json => json::render_json(value)?,
        OutputFormat::Table => table::render_table(value),
        OutputFormat::Csv => csv_out::render_csv(value)?,
        OutputFormat::Minimal => minimal::render_minimal(value),
    };
    Ok(rendered)
}
