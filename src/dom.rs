//! DOM Helpers
//!
//! Thin wrappers over web-sys for the lookups and listeners the page needs.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget, HtmlInputElement, Window};

use crate::error::UiError;

pub fn window() -> Result<Window, UiError> {
    web_sys::window().ok_or_else(|| UiError::MissingElement("window".to_string()))
}

pub fn document() -> Result<Document, UiError> {
    window()?
        .document()
        .ok_or_else(|| UiError::MissingElement("document".to_string()))
}

/// All elements matching `selector`, in document order
pub fn query_all(doc: &Document, selector: &str) -> Result<Vec<Element>, UiError> {
    let list = doc.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

pub fn input_by_id(doc: &Document, id: &str) -> Option<HtmlInputElement> {
    doc.get_element_by_id(id)?.dyn_into().ok()
}

/// `content` of `<meta name="...">`, if present and non-blank
pub fn meta_content(doc: &Document, name: &str) -> Option<String> {
    doc.query_selector(&format!("meta[name='{}']", name))
        .ok()
        .flatten()?
        .get_attribute("content")
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
}

/// Attach a listener for the lifetime of the page
pub fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), UiError> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Run `f` once the DOM is parsed (immediately if it already is)
pub fn when_ready(f: impl FnOnce() + 'static) -> Result<(), UiError> {
    let doc = document()?;
    if doc.ready_state() != "loading" {
        f();
        return Ok(());
    }
    let callback = Closure::once_into_js(f);
    doc.add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref())?;
    Ok(())
}
