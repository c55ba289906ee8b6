//! Fixture Field Binding
//!
//! Finds a page's fixture inputs, seeds an [`InlineEditor`] from their
//! mirrors and commits each one on blur. The DOM is read only when a blur
//! fires and written only through [`DomFieldView`].

use std::collections::HashMap;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use inline_editor::{parse_fixture_id, EditorConfig, FieldView, FixtureId, InlineEditor};
use leptos::mount::mount_to;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, HtmlInputElement};

use crate::components::{FieldMessage, Notice};
use crate::dom;
use crate::error::UiError;
use crate::transport::FetchTransport;

pub type DomEditor = InlineEditor<FetchTransport, DomFieldView>;

/// Elements making up one editable fixture field
struct FieldElements {
    input: HtmlInputElement,
    /// Hidden sibling holding the last confirmed value
    mirror: HtmlInputElement,
    region: Option<Element>,
    notice: RwSignal<Option<Notice>>,
    shown: StoredValue<NoticeTicket>,
}

/// Counts notices shown in one region. A hide timer may only clear the
/// notice it was started for.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NoticeTicket(u64);

impl NoticeTicket {
    pub fn next(self) -> Self {
        NoticeTicket(self.0 + 1)
    }
}

/// A timer started for `started` may hide only if nothing was shown since
pub fn timer_may_hide(started: NoticeTicket, current: NoticeTicket) -> bool {
    started == current
}

pub struct DomFieldView {
    fields: HashMap<FixtureId, FieldElements>,
    info_hide_delay_ms: u32,
}

impl DomFieldView {
    /// Returns the ticket of the notice now showing
    fn set_notice(&self, id: FixtureId, notice: Option<Notice>) -> Option<NoticeTicket> {
        let field = self.fields.get(&id)?;
        if let Some(region) = &field.region {
            mark_region(region, notice.as_ref());
        }
        field.notice.set(notice);
        field.shown.update_value(|ticket| *ticket = ticket.next());
        Some(field.shown.get_value())
    }
}

impl FieldView for DomFieldView {
    fn set_text(&self, id: FixtureId, text: &str) {
        if let Some(field) = self.fields.get(&id) {
            field.input.set_value(text);
        }
    }

    fn set_original(&self, id: FixtureId, text: &str) {
        if let Some(field) = self.fields.get(&id) {
            field.mirror.set_value(text);
        }
    }

    fn clear_message(&self, id: FixtureId) {
        self.set_notice(id, None);
    }

    fn show_error(&self, id: FixtureId, message: &str) {
        self.set_notice(id, Some(Notice::Error(message.to_string())));
    }

    fn show_info(&self, id: FixtureId, message: &str) {
        let Some(started) = self.set_notice(id, Some(Notice::Info(message.to_string()))) else {
            return;
        };
        let Some(field) = self.fields.get(&id) else { return };
        let notice = field.notice;
        let shown = field.shown;
        let region = field.region.clone();
        let delay = self.info_hide_delay_ms;
        spawn_local(async move {
            TimeoutFuture::new(delay).await;
            if timer_may_hide(started, shown.get_value()) {
                if let Some(region) = &region {
                    mark_region(region, None);
                }
                notice.set(None);
                shown.update_value(|ticket| *ticket = ticket.next());
            }
        });
    }

    fn focus(&self, id: FixtureId) {
        if let Some(field) = self.fields.get(&id) {
            if let Err(e) = field.input.focus() {
                log::warn!("Cannot refocus fixture {}: {}", id, UiError::from(e));
            }
        }
    }

    fn notify_failure(&self, status: u16, description: &str) {
        let message = failure_message(status, description);
        match dom::window() {
            Ok(window) => {
                if window.alert_with_message(&message).is_err() {
                    log::error!("{}", message);
                }
            }
            Err(_) => log::error!("{}", message),
        }
    }
}

/// Text of the blocking notice for a failed save
pub fn failure_message(status: u16, description: &str) -> String {
    if status == 0 {
        format!("Saving failed: {}", description)
    } else {
        format!("Saving failed ({}): {}", status, description)
    }
}

/// Toggle `has-error` / `has-info` on a message region
fn mark_region(region: &Element, notice: Option<&Notice>) {
    let classes = region.class_list();
    for (class, on) in [
        ("has-error", matches!(notice, Some(Notice::Error(_)))),
        ("has-info", matches!(notice, Some(Notice::Info(_)))),
    ] {
        if let Err(e) = classes.toggle_with_force(class, on) {
            log::warn!("Cannot toggle {:?} on message region: {}", class, UiError::from(e));
        }
    }
}

/// Bind every input matching `config.field_selector`. Returns how many were bound.
pub fn bind(config: &EditorConfig) -> Result<usize, UiError> {
    let doc = dom::document()?;
    let elements = dom::query_all(&doc, &config.field_selector)?;
    if elements.is_empty() {
        return Ok(0);
    }

    let mut fields = HashMap::new();
    for element in &elements {
        match field_elements(element, config) {
            Ok((id, field)) => {
                fields.insert(id, field);
            }
            Err(e) => log::warn!("Skipping field {:?}: {}", element.id(), e),
        }
    }

    let seeds: Vec<(FixtureId, HtmlInputElement, String)> = fields
        .iter()
        .map(|(id, field)| (*id, field.input.clone(), field.mirror.value()))
        .collect();

    let view = DomFieldView {
        fields,
        info_hide_delay_ms: config.info_hide_delay_ms,
    };
    let editor: Rc<DomEditor> = Rc::new(InlineEditor::new(FetchTransport::new(config.clone()), view));

    for (id, input, original) in seeds {
        editor.register(id, original);
        listen_for_blur(&editor, input, config.csrf_element_id.clone())?;
    }

    log::info!("Bound {} {} fields", editor.field_count(), config.name);
    Ok(editor.field_count())
}

fn listen_for_blur(
    editor: &Rc<DomEditor>,
    input: HtmlInputElement,
    csrf_element_id: String,
) -> Result<(), UiError> {
    let editor = Rc::clone(editor);
    let field = input.clone();
    dom::listen(&input, "blur", move |_| {
        let editor = Rc::clone(&editor);
        let element_id = field.id();
        let current = field.value();
        let csrf_token = read_csrf_token(&csrf_element_id);
        spawn_local(async move {
            if let Err(e) = editor.on_blur(&element_id, &current, &csrf_token).await {
                log::warn!("{}", e);
            }
        });
    })
}

fn read_csrf_token(element_id: &str) -> String {
    let token = dom::document()
        .ok()
        .and_then(|doc| dom::input_by_id(&doc, element_id))
        .map(|input| input.value());
    token.unwrap_or_else(|| {
        log::warn!("No anti-forgery token at #{}", element_id);
        String::new()
    })
}

fn field_elements(element: &Element, config: &EditorConfig) -> Result<(FixtureId, FieldElements), UiError> {
    let input: HtmlInputElement = element
        .clone()
        .dyn_into()
        .map_err(|_| UiError::MissingElement(format!("#{} is not an input", element.id())))?;
    let id = parse_fixture_id(&input.id())?;
    let mirror = input
        .next_element_sibling()
        .and_then(|sibling| sibling.dyn_into::<HtmlInputElement>().ok())
        .ok_or_else(|| UiError::MissingElement(format!("original value for #{}", input.id())))?;

    let region = input
        .closest(&config.message_container)
        .ok()
        .flatten()
        .and_then(|container| container.query_selector(&config.message_selector).ok().flatten());

    let notice = RwSignal::new(None::<Notice>);
    match region.clone().map(|region| region.dyn_into::<HtmlElement>()) {
        Some(Ok(region)) => {
            let notice = notice.read_only();
            mount_to(region, move || view! { <FieldMessage notice=notice /> }).forget();
        }
        _ => log::debug!("No message region for fixture {}", id),
    }

    Ok((
        id,
        FieldElements {
            input,
            mirror,
            region,
            notice,
            shown: StoredValue::new(NoticeTicket::default()),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn older_timer_cannot_hide_a_repeated_notice() {
        // Two saves in a row both answer "Prediction saved"
        let first = NoticeTicket::default().next();
        let second = first.next();

        assert!(!timer_may_hide(first, second));
        assert!(timer_may_hide(second, second));
    }

    #[test]
    fn cleared_notice_stops_pending_timer() {
        let info = NoticeTicket::default().next();
        let cleared = info.next();
        assert!(!timer_may_hide(info, cleared));
    }

    #[test]
    fn failure_message_names_status_and_description() {
        assert_eq!(
            failure_message(500, "Internal Server Error"),
            "Saving failed (500): Internal Server Error"
        );
    }

    #[test]
    fn network_failure_has_no_status() {
        assert_eq!(
            failure_message(0, "Could not reach the server: TypeError: Failed to fetch"),
            "Saving failed: Could not reach the server: TypeError: Failed to fetch"
        );
    }
}
