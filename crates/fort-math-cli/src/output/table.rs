use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{flatten_rows, format_scalar};

fn field_table(rows: &[(String, String)]) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in rows {
        builder.push_record([key.as_str(), val.as_str()]);
    }
    builder.build()
}

/// Render an envelope as a result table followed by inputs, warnings and
/// methodology. Anything else renders as a single field table.
pub fn render_table(value: &Value) -> String {
    let Some(envelope) = value.as_object() else {
        return format_scalar(value);
    };
    let Some(result) = envelope.get("result") else {
        return field_table(&flatten_rows(value)).to_string();
    };

    let mut out = field_table(&flatten_rows(result)).to_string();

    if let Some(assumptions) = envelope.get("assumptions") {
        let rows = flatten_rows(assumptions);
        if !rows.is_empty() {
            out.push_str("\n\nInputs:\n");
            out.push_str(&field_table(&rows).to_string());
        }
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            out.push_str("\n\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                out.push_str(&format!("\n  - {}", w));
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        out.push_str(&format!("\n\nMethodology: {}", meth));
    }
    out
}

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    println!("{}", render_table(value));
}
