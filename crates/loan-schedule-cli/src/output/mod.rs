pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Pretty-print JSON to stdout.
fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => tracing::error!(error = %e, "JSON serialization failed"),
    }
}

/// Preferred leading columns for schedule and yearly rows. Any other keys
/// follow in map order.
const LEADING_COLUMNS: [&str; 10] = [
    "payment_number",
    "year",
    "payment_date",
    "payments",
    "monthly_payment",
    "principal_payment",
    "interest_payment",
    "remaining_balance",
    "cumulative_interest",
    "cumulative_principal",
];

/// Column headers for an array of row objects.
pub(crate) fn column_order(first: &serde_json::Map<String, Value>) -> Vec<String> {
    let mut headers: Vec<String> = LEADING_COLUMNS
        .iter()
        .filter(|c| first.contains_key(**c))
        .map(|c| c.to_string())
        .collect();
    for key in first.keys() {
        if !headers.iter().any(|h| h == key) {
            headers.push(key.clone());
        }
    }
    headers
}

/// Render a scalar JSON value as plain text.
pub(crate) fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_order_puts_schedule_keys_first() {
        let row = json!({
            "cumulative_interest": "1",
            "remaining_balance": "2",
            "payment_number": 1,
            "payment_date": "2024-02-01",
            "extra": true
        });
        let headers = column_order(row.as_object().unwrap());
        assert_eq!(
            headers,
            vec![
                "payment_number",
                "payment_date",
                "remaining_balance",
                "cumulative_interest",
                "extra"
            ]
        );
    }

    #[test]
    fn test_plain_rendering() {
        assert_eq!(plain(&json!("8606.64")), "8606.64");
        assert_eq!(plain(&json!(12)), "12");
        assert_eq!(plain(&Value::Null), "");
    }
}
