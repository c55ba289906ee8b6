//! Save Outcomes
//!
//! Classifies a server round trip into exactly one of three results.

use std::collections::HashMap;

use serde_json::Value;

use crate::config::ResponseKeys;

/// Result of one save round trip
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Server accepted the edit and returned its canonical text
    Saved { text: String, info: Option<String> },
    /// Server answered but rejected the input
    ValidationFailed(String),
    /// Request failed outright (network error, non-2xx status, garbage body)
    TransportFailed { status: u16, description: String },
}

impl SaveOutcome {
    /// Classify a completed HTTP exchange.
    ///
    /// A 2xx response whose JSON carries the error key is a validation
    /// failure; any other 2xx JSON object is a save. Missing canonical
    /// text counts as empty, matching a blank entry on the server.
    pub fn from_response(status: u16, status_text: &str, body: &str, keys: &ResponseKeys) -> Self {
        if !(200..300).contains(&status) {
            return Self::TransportFailed {
                status,
                description: status_text.to_string(),
            };
        }

        let fields: HashMap<String, Value> = match serde_json::from_str(body) {
            Ok(fields) => fields,
            Err(e) => {
                return Self::TransportFailed {
                    status,
                    description: format!("Invalid response body: {}", e),
                }
            }
        };
        let text_of = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);

        if let Some(error) = text_of(&keys.error) {
            return Self::ValidationFailed(error);
        }

        Self::Saved {
            text: text_of(&keys.text).unwrap_or_default(),
            info: text_of(&keys.info).filter(|info| !info.is_empty()),
        }
    }
}
