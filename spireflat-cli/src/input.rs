//! Loading run envelopes from disk.
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Parse a run collection. A document starting with `[` is a JSON array of
/// envelopes; anything else is read as a stream of envelopes, one per line or
/// simply concatenated.
///
/// Only JSON syntax is checked here; envelopes are validated per run.
///
/// # Errors
///
/// Returns an error if the text is not valid JSON.
pub fn parse_runs(text: &str) -> Result<Vec<Value>> {
    if text.trim_start().starts_with('[') {
        return serde_json::from_str(text).context("run collection is not a valid JSON array");
    }
    serde_json::Deserializer::from_str(text)
        .into_iter::<Value>()
        .enumerate()
        .map(|(idx, value)| value.with_context(|| format!("run {idx} is not valid JSON")))
        .collect()
}

/// # Errors
///
/// Returns an error if the file cannot be read or is not valid JSON.
pub fn load_runs(path: &Path) -> Result<Vec<Value>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_runs(&text).with_context(|| format!("failed to parse {}", path.display()))
}
