//! UI Components
//!
//! Leptos components mounted into server-rendered regions.

mod field_message;

pub use field_message::{FieldMessage, Notice};
