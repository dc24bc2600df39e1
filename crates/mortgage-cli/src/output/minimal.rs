use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields in order of priority, then falls back to
/// the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "best",
        "monthly_payment",
        "summary",
        "final_period_count",
        "periodic_prepayment",
        "outstanding_balance",
    ];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        // Best strategy: "<label> <net worth>"
        Value::Object(map) if map.contains_key("label") => format!(
            "{} {}",
            map.get("label").map(format_minimal).unwrap_or_default(),
            map.get("net_worth").map(format_minimal).unwrap_or_default()
        ),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}={}", k, format_minimal(v)))
            .collect::<Vec<_>>()
            .join(" "),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
