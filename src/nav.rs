//! Navigation Highlighter
//!
//! Marks the page's section in the navbar. The page names it in
//! `<meta name="active-menu" content="...">`; exactly one entry ends up
//! active, every other entry loses the class.

use web_sys::Element;

use crate::config::NavConfig;
use crate::dom;
use crate::error::UiError;

/// A navbar entry that can be highlighted
pub trait NavEntry {
    fn matches(&self, selector: &str) -> bool;
    fn set_active(&self, active: bool);
}

struct DomNavEntry<'a> {
    element: Element,
    active_class: &'a str,
}

impl NavEntry for DomNavEntry<'_> {
    /// The entry itself or anything inside it (usually its link)
    fn matches(&self, selector: &str) -> bool {
        self.element.matches(selector).unwrap_or(false)
            || self.element.query_selector(selector).ok().flatten().is_some()
    }

    fn set_active(&self, active: bool) {
        if let Err(e) = self
            .element
            .class_list()
            .toggle_with_force(self.active_class, active)
        {
            log::warn!("Cannot toggle {:?} on navigation entry: {}", self.active_class, UiError::from(e));
        }
    }
}

/// Activate the first entry matching `selector` and deactivate the rest.
/// Returns the index of the active entry.
pub fn select_single<E: NavEntry>(entries: &[E], selector: &str) -> Option<usize> {
    let chosen = entries.iter().position(|entry| entry.matches(selector));
    for (index, entry) in entries.iter().enumerate() {
        entry.set_active(chosen == Some(index));
    }
    chosen
}

/// Marker to selector: `#nav-x` and `.x` pass through, a bare `x` is an id
pub fn marker_selector(marker: &str) -> String {
    let marker = marker.trim();
    if marker.starts_with(['#', '.', '[']) || marker.contains(' ') {
        marker.to_string()
    } else {
        format!("#{}", marker)
    }
}

/// Apply the page's marker. Without one, no entry is touched.
pub fn highlight<E: NavEntry>(marker: Option<&str>, entries: &[E]) -> Option<usize> {
    let Some(marker) = marker else {
        log::debug!("No active-section marker on this page");
        return None;
    };

    let selector = marker_selector(marker);
    let chosen = select_single(entries, &selector);
    if chosen.is_none() {
        log::warn!("No navigation entry matches {}", selector);
    }
    chosen
}

pub fn highlight_active(config: &NavConfig) -> Result<Option<usize>, UiError> {
    let doc = dom::document()?;
    let marker = dom::meta_content(&doc, &config.marker_meta);
    let entries: Vec<DomNavEntry> = dom::query_all(&doc, &config.entry_selector)?
        .into_iter()
        .map(|element| DomNavEntry {
            element,
            active_class: &config.active_class,
        })
        .collect();

    Ok(highlight(marker.as_deref(), &entries))
}
