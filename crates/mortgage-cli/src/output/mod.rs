pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// First field of `map` holding a non-empty array of objects (schedule
/// periods, scenario outcomes, sheet rows).
pub(crate) fn row_field(map: &Map<String, Value>) -> Option<(&str, &[Value])> {
    map.iter().find_map(|(key, val)| match val {
        Value::Array(items) if matches!(items.first(), Some(Value::Object(_))) => {
            Some((key.as_str(), items.as_slice()))
        }
        _ => None,
    })
}

/// Lift one level of nested objects into `parent.child` columns and collapse
/// nested arrays to a row count, so every cell is a scalar.
pub(crate) fn flatten_row(map: &Map<String, Value>) -> Map<String, Value> {
    let mut flat = Map::new();
    for (key, val) in map {
        match val {
            Value::Object(inner) => {
                for (child, v) in inner {
                    let cell = match v {
                        Value::Object(_) | Value::Array(_) => Value::String(summarise(v)),
                        other => other.clone(),
                    };
                    flat.insert(format!("{}.{}", key, child), cell);
                }
            }
            Value::Array(items) if matches!(items.first(), Some(Value::Object(_))) => {
                flat.insert(key.clone(), Value::String(format!("[{} rows]", items.len())));
            }
            other => {
                flat.insert(key.clone(), other.clone());
            }
        }
    }
    flat
}

fn summarise(value: &Value) -> String {
    match value {
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(map) => format!("{{{} fields}}", map.len()),
        other => other.to_string(),
    }
}
