use serde_json::{Map, Value};
use std::io::{self, Write};

use super::{column_order, plain};

/// Write output as CSV to stdout.
///
/// The monthly schedule (or yearly totals, for the summary command) becomes
/// one row per period. Without either, the summary is written as two-column
/// field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(stdout.lock(), value) {
        tracing::error!(error = %e, "CSV output failed");
    }
}

fn write_csv<W: Write>(out: W, value: &Value) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(out);

    let result = value.get("result").unwrap_or(value);
    let rows = ["schedule", "yearly"]
        .iter()
        .find_map(|key| result.get(*key).and_then(Value::as_array));

    match (rows, result) {
        (Some(rows), _) => write_rows(&mut wtr, rows)?,
        (None, Value::Object(map)) => {
            let fields = map
                .get("summary")
                .and_then(Value::as_object)
                .unwrap_or(map);
            write_fields(&mut wtr, fields)?;
        }
        (None, Value::Array(rows)) => write_rows(&mut wtr, rows)?,
        (None, other) => wtr.write_record([plain(other)])?,
    }

    wtr.flush()?;
    Ok(())
}

fn write_rows<W: Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> Result<(), csv::Error> {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            wtr.write_record([plain(item)])?;
        }
        return Ok(());
    };

    let headers = column_order(first);
    wtr.write_record(&headers)?;
    for item in rows {
        if let Value::Object(map) = item {
            wtr.write_record(
                headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(plain).unwrap_or_default()),
            )?;
        }
    }
    Ok(())
}

fn write_fields<W: Write>(
    wtr: &mut csv::Writer<W>,
    fields: &Map<String, Value>,
) -> Result<(), csv::Error> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in fields {
        wtr.write_record([key.clone(), plain(val)])?;
    }
    Ok(())
}
