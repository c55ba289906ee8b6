//! Fetch Transport
//!
//! Posts a save request as a form and classifies the reply.

use async_trait::async_trait;
use inline_editor::{EditorConfig, SaveOutcome, SaveRequest, SaveTransport};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestCredentials, RequestInit, Response};

use crate::dom;
use crate::error::UiError;

/// Completed exchange: status, status text, body
struct RawReply {
    status: u16,
    status_text: String,
    body: String,
}

/// Where a save request broke down
#[derive(Debug)]
enum FetchError {
    /// Request could not be built, nothing was sent
    Build(UiError),
    /// fetch() rejected, no HTTP response arrived
    Network(UiError),
    /// Response arrived but its body could not be read
    Body { status: u16, error: UiError },
}

impl FetchError {
    fn into_outcome(self) -> SaveOutcome {
        let (status, description) = match self {
            FetchError::Build(e) => (0, format!("Request not sent: {}", message_of(e))),
            FetchError::Network(e) => (0, format!("Could not reach the server: {}", message_of(e))),
            FetchError::Body { status, error } => {
                (status, format!("Unreadable response: {}", message_of(error)))
            }
        };
        SaveOutcome::TransportFailed { status, description }
    }
}

fn message_of(error: UiError) -> String {
    match error {
        UiError::Js(text) => text,
        other => other.to_string(),
    }
}

pub struct FetchTransport {
    config: EditorConfig,
}

impl FetchTransport {
    pub fn new(config: EditorConfig) -> Self {
        Self { config }
    }

    fn build_request(&self, body: &str) -> Result<Request, UiError> {
        let headers = Headers::new()?;
        headers.set("Content-Type", "application/x-www-form-urlencoded; charset=UTF-8")?;
        headers.set("Accept", "application/json")?;
        headers.set("X-Requested-With", "XMLHttpRequest")?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_credentials(RequestCredentials::SameOrigin);
        init.set_headers(&headers);
        init.set_body(&JsValue::from_str(body));

        Ok(Request::new_with_str_and_init(&self.config.endpoint, &init)?)
    }

    async fn post_form(&self, body: &str) -> Result<RawReply, FetchError> {
        let request = self.build_request(body).map_err(FetchError::Build)?;
        let window = dom::window().map_err(FetchError::Build)?;

        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .and_then(|value| value.dyn_into())
            .map_err(|e| FetchError::Network(e.into()))?;

        let status = response.status();
        let body = match response.text() {
            Ok(text) => JsFuture::from(text).await,
            Err(e) => Err(e),
        }
        .map_err(|e| FetchError::Body {
            status,
            error: e.into(),
        })?;

        Ok(RawReply {
            status,
            status_text: response.status_text(),
            body: body.as_string().unwrap_or_default(),
        })
    }
}

#[async_trait(?Send)]
impl SaveTransport for FetchTransport {
    async fn save(&self, request: &SaveRequest) -> SaveOutcome {
        let body = request.form_body(&self.config.params);
        match self.post_form(&body).await {
            Ok(reply) => SaveOutcome::from_response(
                reply.status,
                &reply.status_text,
                &reply.body,
                &self.config.response,
            ),
            Err(e) => {
                log::debug!("Save to {} broke down: {:?}", self.config.endpoint, e);
                e.into_outcome()
            }
        }
    }
}
