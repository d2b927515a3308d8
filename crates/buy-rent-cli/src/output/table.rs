use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::scalar_text;

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => {
                println!("{}", pairs_table(result));
                print_envelope_notes(map);
            }
            _ => println!("{}", pairs_table(map)),
        },
        Value::Array(rows) => print_rows(rows),
        _ => println!("{}", value),
    }
}

fn pairs_table(fields: &serde_json::Map<String, Value>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in fields {
        builder.push_record([key.as_str(), &scalar_text(val)]);
    }
    builder.build()
}

fn print_envelope_notes(envelope: &serde_json::Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        if rows.is_empty() {
            println!("(empty)");
        }
        for row in rows {
            println!("{}", scalar_text(row));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(String::as_str));
    for row in rows {
        builder.push_record(
            headers
                .iter()
                .map(|h| row.get(h.as_str()).map(scalar_text).unwrap_or_default()),
        );
    }
    println!("{}", builder.build());
}
