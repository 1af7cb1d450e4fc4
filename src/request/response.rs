//! Typed response shapes and record extraction

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

/// Acknowledgement for endpoints that return no meaningful body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmptyResponse {
    /// Whatever JSON came back, `Null` for an empty body
    #[serde(default)]
    pub body: JsonValue,
}

/// Error payload returned by an API
///
/// Common fields are lifted out; anything else stays in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status of the response (filled in after decoding)
    #[serde(skip)]
    pub status: u16,

    /// Machine-readable error code
    #[serde(default)]
    pub code: Option<JsonValue>,

    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,

    /// Remaining fields
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl ErrorResponse {
    /// True when the response carried a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Best available description: `message`, else a string `error` or `detail` field
    pub fn description(&self) -> Option<&str> {
        self.message.as_deref().or_else(|| {
            ["error", "detail"]
                .iter()
                .find_map(|key| self.extra.get(*key).and_then(JsonValue::as_str))
        })
    }
}

/// Extract the records array from a JSON body
///
/// With no path the body itself must be an array. With a dot path
/// (`data.items`, optionally prefixed by `$.`) the value at that path must be
/// an array; a missing or `null` value yields no records.
pub fn extract_records(body: &JsonValue, path: Option<&str>) -> Result<Vec<JsonValue>> {
    let target = match path {
        None => Some(body),
        Some(path) => extract_path(body, path),
    };

    match target {
        Some(JsonValue::Array(items)) => Ok(items.clone()),
        Some(JsonValue::Null) | None => Ok(Vec::new()),
        Some(other) => Err(Error::decode(format!(
            "expected an array at '{}', found {}",
            path.unwrap_or("$"),
            json_type_name(other)
        ))),
    }
}

fn extract_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        current = match current {
            JsonValue::Object(map) => map.get(part)?,
            JsonValue::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
