use serde_json::{json, Value};

use buy_rent_core::inputs::input_fields;

pub fn run_fields() -> Result<Value, Box<dyn std::error::Error>> {
    let rows: Vec<Value> = input_fields()
        .iter()
        .map(|f| {
            json!({
                "name": f.name,
                "label": f.label(),
                "default": f.default.to_string(),
                "range": f.domain.describe(),
                "help": f.help,
            })
        })
        .collect();
    Ok(Value::Array(rows))
}
