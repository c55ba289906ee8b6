//! UI Errors

use inline_editor::EditorError;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Errors from wiring the page; none of these reach the user directly
#[derive(Error, Debug)]
pub enum UiError {
    /// Expected element (or window/document) is not there
    #[error("Missing element: {0}")]
    MissingElement(String),

    /// A browser API threw
    #[error("JavaScript error: {0}")]
    Js(String),

    /// Embedded page config did not parse
    #[error("Invalid page config: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Editor(#[from] EditorError),
}

impl From<JsValue> for UiError {
    fn from(value: JsValue) -> Self {
        UiError::Js(js_error_text(&value))
    }
}

/// Best-effort message out of a thrown JS value
pub fn js_error_text(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{:?}", value)
}
