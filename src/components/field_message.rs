//! Field Message Component
//!
//! Inline error or info notice shown in a fixture row's message region.

use leptos::prelude::*;

/// What a message region currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Error(String),
    Info(String),
}

impl Notice {
    pub fn class(&self) -> &'static str {
        match self {
            Notice::Error(_) => "field-message-text error",
            Notice::Info(_) => "field-message-text info",
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Notice::Error(text) | Notice::Info(text) => text,
        }
    }
}

#[component]
pub fn FieldMessage(notice: ReadSignal<Option<Notice>>) -> impl IntoView {
    view! {
        {move || notice.get().map(|notice| {
            let class = notice.class();
            let text = notice.text().to_string();
            let role = if matches!(notice, Notice::Error(_)) { "alert" } else { "status" };
            view! { <span class=class role=role>{text}</span> }
        })}
    }
}
