use serde_json::Value;

use super::format_scalar;

/// Fields that carry the answer, in priority order. A quote answers with its
/// total value, a price with the call value, a CDF with the table value.
const PRIORITY_KEYS: [&str; 4] = ["total_value", "call_value", "table", "brute_force"];

/// Pick just the key answer value from the output.
///
/// For conversions the answer depends on the direction: encoding answers
/// with `raw`, decoding with `decimal`.
pub fn render_minimal(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let direction = value
        .pointer("/assumptions/direction")
        .and_then(Value::as_str);

    if let Value::Object(map) = result_obj {
        if let Some(dir) = direction {
            let key = if dir == "encode" { "raw" } else { "decimal" };
            if let Some(val) = map.get(key) {
                return format_scalar(val);
            }
        }

        for key in &PRIORITY_KEYS {
            if let Some(val) = map.get(*key).filter(|v| !v.is_null()) {
                return format_scalar(val);
            }
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_scalar(val));
        }
    }

    format_scalar(result_obj)
}

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", render_minimal(value));
}
