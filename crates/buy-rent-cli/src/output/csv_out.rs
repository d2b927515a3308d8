use serde_json::Value;
use std::io;

use super::scalar_text;

/// Write output as CSV to stdout.
///
/// A computation envelope becomes `field,value` rows of its result; an array
/// of objects becomes one row per object under the first object's keys.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let outcome = match value {
        Value::Object(map) => {
            let fields = match map.get("result") {
                Some(Value::Object(result)) => result,
                _ => map,
            };
            write_pairs(&mut wtr, fields)
        }
        Value::Array(rows) => write_rows(&mut wtr, rows),
        _ => wtr.write_record([scalar_text(value)]),
    };

    if let Err(e) = outcome.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV output error: {}", e);
    }
}

fn write_pairs<W: io::Write>(
    wtr: &mut csv::Writer<W>,
    fields: &serde_json::Map<String, Value>,
) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in fields {
        wtr.write_record([key.as_str(), &scalar_text(val)])?;
    }
    Ok(())
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = rows.first() else {
        for row in rows {
            wtr.write_record([scalar_text(row)])?;
        }
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    wtr.write_record(&headers)?;
    for row in rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| row.get(*h).map(scalar_text).unwrap_or_default())
            .collect();
        wtr.write_record(&cells)?;
    }
    Ok(())
}
