//! Competition-Scoped Links
//!
//! Links under the competition drop-down act on whichever competition is
//! selected, so their target only gets decided at click time.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use wasm_bindgen::JsCast;
use web_sys::HtmlSelectElement;

use crate::config::LinkConfig;
use crate::dom;
use crate::error::UiError;

/// `href` with `param=competition` appended to its query, fragment kept last
pub fn scoped_href(href: &str, param: &str, competition: &str) -> String {
    let (base, fragment) = match href.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (href, None),
    };
    let separator = match base.find('?') {
        None => "?",
        Some(_) if base.ends_with('?') || base.ends_with('&') => "",
        Some(_) => "&",
    };

    let mut scoped = format!(
        "{}{}{}={}",
        base,
        separator,
        param,
        utf8_percent_encode(competition, NON_ALPHANUMERIC)
    );
    if let Some(fragment) = fragment {
        scoped.push('#');
        scoped.push_str(fragment);
    }
    scoped
}

fn selected_competition(selector: &str) -> Option<String> {
    let select = dom::document()
        .ok()?
        .query_selector(selector)
        .ok()
        .flatten()?
        .dyn_into::<HtmlSelectElement>()
        .ok()?;
    Some(select.value())
}

/// Intercept clicks on every matching link. Returns how many were bound.
pub fn bind(config: &LinkConfig) -> Result<usize, UiError> {
    let doc = dom::document()?;
    let links = dom::query_all(&doc, &config.link_selector)?;

    for link in &links {
        let anchor = link.clone();
        let config = config.clone();
        dom::listen(link, "click", move |event| {
            event.prevent_default();

            let href = anchor.get_attribute("href").unwrap_or_default();
            let competition = selected_competition(&config.competition_select).unwrap_or_else(|| {
                log::warn!("No competition selector at {}", config.competition_select);
                String::new()
            });
            let target = scoped_href(&href, &config.param, &competition);
            log::debug!("Navigating to {}", target);

            if let Err(e) = dom::window().and_then(|window| Ok(window.location().set_href(&target)?)) {
                log::error!("Cannot navigate to {}: {}", target, e);
            }
        })?;
    }

    Ok(links.len())
}
