use serde_json::Value;

use super::scalar_text;

/// Print just the key answer: the present value of buying and the verdict.
///
/// Falls back to the first field when the output is not a valuation.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        if let Some(net_income) = map.get("net_income").filter(|v| !v.is_null()) {
            match map.get("recommendation") {
                Some(rec) => println!("{} {}", scalar_text(net_income), scalar_text(rec)),
                None => println!("{}", scalar_text(net_income)),
            }
            return;
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, scalar_text(val));
            return;
        }
    }

    if let Value::Array(rows) = result_obj {
        for row in rows {
            match row.get("name") {
                Some(name) => println!("{}", scalar_text(name)),
                None => println!("{}", scalar_text(row)),
            }
        }
        return;
    }

    println!("{}", scalar_text(result_obj));
}
