//! Output serialization for flattened floor records.
use std::borrow::Cow;
use std::collections::HashSet;
use std::io::Write;

use anyhow::Result;
use serde_json::{Map, Value};
use spireflat_game::FloorRecord;

/// Column union over `rows`, in order of first appearance.
pub fn columns(rows: &[Map<String, Value>]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for row in rows {
        for key in row.keys() {
            if seen.insert(key.as_str()) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// Text of one CSV cell. Missing and null values are empty; nested values
/// are written as compact JSON.
fn cell_text(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(Value::String(text)) => Cow::Borrowed(text),
        Some(Value::Bool(flag)) => Cow::Borrowed(if *flag { "true" } else { "false" }),
        Some(Value::Number(number)) => Cow::Owned(number.to_string()),
        Some(nested) => Cow::Owned(nested.to_string()),
    }
}

fn quoted(text: &str) -> Cow<'_, str> {
    if text.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", text.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(text)
    }
}

fn write_line<'a, W: Write + ?Sized>(
    out: &mut W,
    cells: impl Iterator<Item = Cow<'a, str>>,
) -> std::io::Result<()> {
    let line: Vec<String> = cells.map(|c| quoted(&c).into_owned()).collect();
    writeln!(out, "{}", line.join(","))
}

/// Write a header row plus one row per record. Nothing is written when there
/// are no records.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_csv<W: Write + ?Sized>(out: &mut W, records: &[FloorRecord]) -> Result<()> {
    let rows: Vec<Map<String, Value>> = records.iter().map(FloorRecord::to_json).collect();
    let columns = columns(&rows);
    if columns.is_empty() {
        return Ok(());
    }
    write_line(out, columns.iter().map(|c| Cow::Borrowed(c.as_str())))?;
    for row in &rows {
        write_line(out, columns.iter().map(|c| cell_text(row.get(c))))?;
    }
    Ok(())
}

/// Write the records as a JSON array of objects whose keys keep column order.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write + ?Sized>(out: &mut W, records: &[FloorRecord]) -> Result<()> {
    let rows: Vec<Value> = records
        .iter()
        .map(|r| Value::Object(r.to_json()))
        .collect();
    serde_json::to_writer_pretty(&mut *out, &rows)?;
    writeln!(out)?;
    Ok(())
}
