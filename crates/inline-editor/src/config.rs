//! Editor Configuration
//!
//! Per-page settings. The two pages that edit fixtures differ in endpoint,
//! request parameter and response key, so each gets its own preset.

use serde::{Deserialize, Serialize};

/// Form parameter names sent with a save request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormParams {
    pub fixture: String,
    pub text: String,
    pub csrf: String,
}

/// JSON keys read from a save response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseKeys {
    /// Canonical text key; `predictionText` or `resultText` depending on page
    pub text: String,
    #[serde(default = "default_error_key")]
    pub error: String,
    #[serde(default = "default_info_key")]
    pub info: String,
}

/// Everything one page needs to wire its editable fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Short name used in logs
    pub name: String,
    /// Inputs that commit on blur
    pub field_selector: String,
    /// POST target for saves
    pub endpoint: String,
    pub params: FormParams,
    pub response: ResponseKeys,
    /// Id of the page-level anti-forgery token input
    #[serde(default = "default_csrf_element")]
    pub csrf_element_id: String,
    /// Closest ancestor of the input that holds its message region
    #[serde(default = "default_message_container")]
    pub message_container: String,
    /// Message region, looked up inside `message_container`
    #[serde(default = "default_message_selector")]
    pub message_selector: String,
    #[serde(default = "default_info_hide_delay_ms")]
    pub info_hide_delay_ms: u32,
}

fn default_error_key() -> String {
    "errorText".to_string()
}

fn default_info_key() -> String {
    "infoText".to_string()
}

fn default_csrf_element() -> String {
    "_csrf".to_string()
}

fn default_message_container() -> String {
    "tr".to_string()
}

fn default_message_selector() -> String {
    ".field-message".to_string()
}

fn default_info_hide_delay_ms() -> u32 {
    3000
}

impl EditorConfig {
    /// Player entering predictions for upcoming fixtures
    pub fn predictions() -> Self {
        Self::preset(
            "predictions",
            "#upcoming-fixtures input[name='prediction']",
            "/league/savePrediction",
            "predictionText",
        )
    }

    /// Administrator entering final results
    pub fn results() -> Self {
        Self::preset(
            "results",
            "#fixture-results input[name='result']",
            "/competition/saveResult",
            "resultText",
        )
    }

    fn preset(name: &str, field_selector: &str, endpoint: &str, text_key: &str) -> Self {
        Self {
            name: name.to_string(),
            field_selector: field_selector.to_string(),
            endpoint: endpoint.to_string(),
            params: FormParams {
                fixture: "fixture".to_string(),
                text: text_key.to_string(),
                csrf: "_csrf".to_string(),
            },
            response: ResponseKeys {
                text: text_key.to_string(),
                error: default_error_key(),
                info: default_info_key(),
            },
            csrf_element_id: default_csrf_element(),
            message_container: default_message_container(),
            message_selector: default_message_selector(),
            info_hide_delay_ms: default_info_hide_delay_ms(),
        }
    }
}
