//! The structure a form plugin hands back to the browser after a submission.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Loosely-typed response object: a `status` plus plugin-specific fields
/// such as `html` or `message`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormResponse(Map<String, Value>);

impl FormResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn status(&self) -> Option<&str> {
        self.get_str("status")
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Append `suffix` to the string field `key`, creating it when absent.
    /// A non-string value is replaced by `suffix`.
    pub fn append_str(&mut self, key: &str, suffix: &str) {
        let mut current = self.get_str(key).unwrap_or_default().to_string();
        current.push_str(suffix);
        self.0.insert(key.to_string(), Value::String(current));
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
