use serde_json::Value;
use std::io;

use super::flatten_rows;

/// Write the result section as two-column `field,value` CSV.
pub fn write_csv<W: io::Write>(writer: W, value: &Value) -> csv::Result<()> {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["field", "value"])?;
    for (key, val) in flatten_rows(result) {
        wtr.write_record([key.as_str(), val.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(stdout.lock(), value) {
        eprintln!("CSV write error: {}", e);
    }
}
