use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::data::Item;

/// Fixed relative path the directory is read from when nothing else is configured.
pub const DEFAULT_SOURCE: &str = "data.json";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid data format: expected a JSON array of items")]
    NotAnArray,
}

impl LoadError {
    /// Static text shown in place of the list when loading fails.
    pub const USER_MESSAGE: &'static str =
        "Failed to load data. Please make sure the data file exists and is valid.";
}

/// Load items from a local path or an `http(s)://` URL.
pub fn load(source: &str) -> Result<Vec<Item>, LoadError> {
    let body = if is_remote(source) {
        fetch(source)?
    } else {
        std::fs::read_to_string(Path::new(source)).map_err(|source_err| LoadError::Io {
            path: source.to_string(),
            source: source_err,
        })?
    };

    let items = parse_items(&body)?;
    tracing::info!(source, count = items.len(), "loaded directory");
    Ok(items)
}

fn is_remote(source: &str) -> bool {
    let lower = source.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn fetch(url: &str) -> Result<String, LoadError> {
    let http_err = |source| LoadError::Http {
        url: url.to_string(),
        source,
    };

    let response = reqwest::blocking::get(url).map_err(http_err)?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().map_err(http_err)
}

/// Decode a JSON document whose top-level value must be an array of item records.
///
/// Records that are not objects are skipped; everything else degrades field by
/// field, so a sparse record still yields an item.
pub fn parse_items(body: &str) -> Result<Vec<Item>, LoadError> {
    let Value::Array(values) = serde_json::from_str::<Value>(body)? else {
        return Err(LoadError::NotAnArray);
    };

    let mut items = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        if !value.is_object() {
            tracing::warn!(index, "skipping record that is not an object");
            continue;
        }
        match serde_json::from_value::<Item>(value) {
            Ok(item) => items.push(item),
            Err(err) => tracing::warn!(index, error = %err, "skipping undecodable record"),
        }
    }
    Ok(items)
}
