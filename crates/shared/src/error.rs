use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body the accident service sends alongside non-2xx statuses.
///
/// `detail` is a plain string for handled errors and a list of field
/// problems for request validation failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
