//! Batch file loading
//!
//! A batch file is either a JSON array of term objects or the dump format
//! `{"terms": [...]}` written by `terms create`.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;

pub fn load_batch(path: &Path) -> Result<Vec<Value>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file: {}", path.display()))?;
    parse_batch_json(&text).with_context(|| format!("Invalid batch file: {}", path.display()))
}

pub fn parse_batch_json(text: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(text).context("Batch file is not valid JSON")?;
    match value {
        Value::Array(records) => Ok(records),
        Value::Object(mut map) => match map.remove("terms") {
            Some(Value::Array(records)) => Ok(records),
            _ => bail!("expected a 'terms' array in the batch object"),
        },
        _ => bail!("expected a JSON array of term objects or an object with a 'terms' array"),
    }
}
