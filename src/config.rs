//! Page Configuration
//!
//! Defaults cover every page of the site. A page can override any part by
//! embedding `<script type="application/json" id="predict-ui-config">`;
//! objects merge key by key, everything else replaces.

use inline_editor::EditorConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dom;
use crate::error::UiError;

pub const CONFIG_ELEMENT_ID: &str = "predict-ui-config";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    /// `error`, `warn`, `info`, `debug` or `trace`
    pub log_level: String,
    /// Every editor whose selector matches something on the page gets bound
    pub editors: Vec<EditorConfig>,
    pub nav: NavConfig,
    pub links: LinkConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavConfig {
    /// `<meta name>` declaring the active section
    pub marker_meta: String,
    pub entry_selector: String,
    pub active_class: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkConfig {
    /// Links that act on the selected competition
    pub link_selector: String,
    pub competition_select: String,
    pub param: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            editors: vec![EditorConfig::predictions(), EditorConfig::results()],
            nav: NavConfig::default(),
            links: LinkConfig::default(),
        }
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            marker_meta: "active-menu".to_string(),
            entry_selector: ".navbar-nav li".to_string(),
            active_class: "active".to_string(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            link_selector: "#competition-links li.requires-competition > a".to_string(),
            competition_select: "#competitions-list".to_string(),
            param: "competition".to_string(),
        }
    }
}

/// Defaults with the page's embedded overrides applied
pub fn load() -> Result<PageConfig, UiError> {
    let doc = dom::document()?;
    match doc
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|element| element.text_content())
    {
        Some(json) if !json.trim().is_empty() => with_overrides(&json),
        _ => Ok(PageConfig::default()),
    }
}

pub fn with_overrides(json: &str) -> Result<PageConfig, UiError> {
    let mut config = serde_json::to_value(PageConfig::default())?;
    let overrides: Value = serde_json::from_str(json)?;
    merge(&mut config, overrides);
    Ok(serde_json::from_value(config)?)
}

fn merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                merge(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (slot, patch) => *slot = patch,
    }
}
