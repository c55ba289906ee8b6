use thiserror::Error;

use crate::field::FixtureId;

/// Errors raised by the editor itself (not by the server).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    /// Element id has no numeric suffix after its first `_`
    #[error("Bad field id: {0:?}")]
    BadFieldId(String),

    /// Blur on a fixture that was never registered
    #[error("Unknown field: fixture {0}")]
    UnknownField(FixtureId),
}
