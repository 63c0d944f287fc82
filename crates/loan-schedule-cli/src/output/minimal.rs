use serde_json::Value;

use super::plain;

/// Print just the key answer: the level monthly payment.
///
/// Looks in `result.summary` first, then `result`, then falls back to the
/// first field of the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = ["monthly_payment", "total_interest", "total_amount_paid"];

    let scopes = [result_obj.get("summary"), Some(result_obj)];
    for scope in scopes.into_iter().flatten() {
        for key in &priority_keys {
            if let Some(val) = scope.get(*key) {
                if !val.is_null() {
                    println!("{}", plain(val));
                    return;
                }
            }
        }
    }

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, plain(val));
            return;
        }
    }

    println!("{}", plain(result_obj));
}
