//! Inline Field Editor
//!
//! Commit-on-blur editing for fixture fields. The editor owns one
//! [`FieldState`] per fixture and talks to the outside world through two
//! seams: [`SaveTransport`] (the server round trip) and [`FieldView`]
//! (the page). Nothing in this crate touches the browser.

mod config;
mod editor;
mod error;
mod field;
mod outcome;

pub use config::{EditorConfig, FormParams, ResponseKeys};
pub use editor::{BlurOutcome, FieldView, InlineEditor, SaveTransport};
pub use error::EditorError;
pub use field::{parse_fixture_id, FieldState, FixtureId, RequestSeq, SaveRequest};
pub use outcome::SaveOutcome;
