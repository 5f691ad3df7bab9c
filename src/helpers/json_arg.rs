use std::fs;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::schema;

/// Parse a JSON command argument given inline or as `@path/to/file.json`.
pub fn read_json_arg<T: DeserializeOwned>(arg: &str) -> Result<T> {
    let raw = match arg.strip_prefix('@') {
        Some(path) => fs::read_to_string(path).with_context(|| format!("Could not read '{path}'"))?,
        None => arg.to_string(),
    };
    Ok(schema::from_json(&raw)?)
}
