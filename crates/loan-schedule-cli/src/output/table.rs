use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{column_order, plain};

/// Format output as tables using the tabled crate.
///
/// Each object inside `result` (summary, page info) becomes a field/value
/// table and each array of rows (schedule, yearly totals) a row table.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_result_tables(result, map),
            _ => print_field_table(map),
        },
        Value::Array(arr) => print_row_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_tables(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    let mut scalars = Map::new();

    for (key, val) in result {
        match val {
            Value::Object(section) => {
                println!("{}", title(key));
                print_field_table(section);
                println!();
            }
            Value::Array(rows) => {
                println!("{}", title(key));
                print_row_table(rows);
                println!();
            }
            _ => {
                scalars.insert(key.clone(), val.clone());
            }
        }
    }

    if !scalars.is_empty() {
        print_field_table(&scalars);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("Warnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_field_table(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &plain(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_row_table(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        if rows.is_empty() {
            println!("(no rows)");
        }
        for item in rows {
            println!("{}", plain(item));
        }
        return;
    };

    let headers = column_order(first);
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(String::as_str));

    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(plain).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }

    println!("{}", Table::from(builder));
}

fn title(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    for word in key.split('_') {
        let mut chars = word.chars();
        if let Some(c) = chars.next() {
            words.push(c.to_uppercase().chain(chars).collect());
        }
    }
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title("summary"), "Summary");
        assert_eq!(title("yearly_totals"), "Yearly Totals");
    }
}
