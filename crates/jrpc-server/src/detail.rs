//! Key/value annotations explaining why a request was rejected.

use serde_json::{Map, Value};

/// Key used by the built-in rejections to carry a human-readable reason.
pub const RATIONALE: &str = "rationale";

/// A single annotation merged into an error's `data` object.
#[derive(Debug, Clone, PartialEq)]
pub struct Detail {
    key: String,
    value: Value,
}

impl Detail {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Shorthand for `Detail::new("rationale", reason)`
    pub fn rationale(reason: impl Into<String>) -> Self {
        Self::new(RATIONALE, reason.into())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_parts(self) -> (String, Value) {
        (self.key, self.value)
    }
}

/// Merge details into an error `data` object.
///
/// Returns `None` when there is nothing to report. Later details overwrite
/// earlier ones that share a key.
pub fn details_to_data<I>(details: I) -> Option<Map<String, Value>>
where
    I: IntoIterator<Item = Detail>,
{
    let data: Map<String, Value> = details.into_iter().map(Detail::into_parts).collect();
    if data.is_empty() { None } else { Some(data) }
}
