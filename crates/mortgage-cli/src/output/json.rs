use colored::Colorize;
use serde_json::Value;

/// Pretty JSON on stdout. Envelope warnings are repeated on stderr so they
/// stay visible when stdout is piped.
pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
    for warning in warnings(value) {
        eprintln!("{}: {}", "warning".yellow().bold(), warning);
    }
}

fn warnings(value: &Value) -> Vec<&str> {
    value
        .get("warnings")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}
