//! Field Model
//!
//! Fixture ids, per-field state and the save request built from an edit.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::config::FormParams;
use crate::error::EditorError;

/// Characters left bare in form values, as browsers do
const FORM_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'*');

/// Id of a scheduled fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FixtureId(pub u32);

impl fmt::Display for FixtureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequence number stamped on every save request an editor issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestSeq(pub u64);

/// Parse the fixture id out of an element id such as `fixture_21`.
///
/// Everything after the first `_` must be an unsigned integer.
pub fn parse_fixture_id(element_id: &str) -> Result<FixtureId, EditorError> {
    element_id
        .split_once('_')
        .and_then(|(_, suffix)| suffix.parse::<u32>().ok())
        .map(FixtureId)
        .ok_or_else(|| EditorError::BadFieldId(element_id.to_string()))
}

/// Editor-side record for one editable field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldState {
    pub id: FixtureId,
    /// What the input currently shows
    pub displayed: String,
    /// Last value confirmed by the server
    pub original: String,
    /// Latest request still awaiting a response
    pub pending: Option<RequestSeq>,
    /// Latest request ever issued for this field
    pub last_issued: Option<RequestSeq>,
}

impl FieldState {
    pub fn new(id: FixtureId, original: impl Into<String>) -> Self {
        let original = original.into();
        Self {
            id,
            displayed: original.clone(),
            original,
            pending: None,
            last_issued: None,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.displayed != self.original
    }
}

/// One save round trip's payload
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub seq: RequestSeq,
    pub fixture: FixtureId,
    pub text: String,
    pub csrf_token: String,
}

impl SaveRequest {
    /// `application/x-www-form-urlencoded` body using the page's parameter names
    pub fn form_body(&self, params: &FormParams) -> String {
        let fixture = self.fixture.to_string();
        [
            (params.fixture.as_str(), fixture.as_str()),
            (params.text.as_str(), self.text.as_str()),
            (params.csrf.as_str(), self.csrf_token.as_str()),
        ]
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, FORM_VALUE),
                utf8_percent_encode(value, FORM_VALUE)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
    }
}
