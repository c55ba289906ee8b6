//! Inline Editor Controller
//!
//! Owns every field's state. The page is only read at blur time and only
//! written through [`FieldView`].

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::EditorError;
use crate::field::{parse_fixture_id, FieldState, FixtureId, RequestSeq, SaveRequest};
use crate::outcome::SaveOutcome;

/// Sends a save request to the server
#[async_trait(?Send)]
pub trait SaveTransport {
    async fn save(&self, request: &SaveRequest) -> SaveOutcome;
}

/// Write side of the page for editable fields
pub trait FieldView {
    /// Set the text the input shows
    fn set_text(&self, id: FixtureId, text: &str);
    /// Set the mirror that holds the last confirmed value
    fn set_original(&self, id: FixtureId, text: &str);
    fn clear_message(&self, id: FixtureId);
    fn show_error(&self, id: FixtureId, message: &str);
    /// Show a message that hides itself after a while
    fn show_info(&self, id: FixtureId, message: &str);
    fn focus(&self, id: FixtureId);
    /// Blocking, page-level failure notice
    fn notify_failure(&self, status: u16, description: &str);
}

/// What a blur led to
#[derive(Debug, Clone, PartialEq)]
pub enum BlurOutcome {
    /// Text matched the confirmed value, nothing sent
    Unchanged,
    Submitted(SaveOutcome),
}

pub struct InlineEditor<T, V> {
    transport: T,
    view: V,
    fields: RefCell<HashMap<FixtureId, FieldState>>,
    next_seq: Cell<u64>,
    stale_responses: Cell<u64>,
}

impl<T: SaveTransport, V: FieldView> InlineEditor<T, V> {
    pub fn new(transport: T, view: V) -> Self {
        Self {
            transport,
            view,
            fields: RefCell::new(HashMap::new()),
            next_seq: Cell::new(0),
            stale_responses: Cell::new(0),
        }
    }

    /// Seed a field with the value the server rendered into the page
    pub fn register(&self, id: FixtureId, original: impl Into<String>) {
        self.fields.borrow_mut().insert(id, FieldState::new(id, original));
    }

    pub fn field(&self, id: FixtureId) -> Option<FieldState> {
        self.fields.borrow().get(&id).cloned()
    }

    pub fn field_count(&self) -> usize {
        self.fields.borrow().len()
    }

    /// Responses that arrived after a newer request for the same field was issued
    pub fn stale_responses(&self) -> u64 {
        self.stale_responses.get()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Record the text the field shows and decide whether it needs saving.
    ///
    /// Returns `None` when the text is byte-for-byte the confirmed value.
    pub fn begin_edit(
        &self,
        id: FixtureId,
        current: &str,
        csrf_token: &str,
    ) -> Result<Option<SaveRequest>, EditorError> {
        let mut fields = self.fields.borrow_mut();
        let field = fields.get_mut(&id).ok_or(EditorError::UnknownField(id))?;

        field.displayed = current.to_string();
        if !field.is_dirty() {
            return Ok(None);
        }

        let seq = RequestSeq(self.next_seq.get() + 1);
        self.next_seq.set(seq.0);
        field.pending = Some(seq);
        field.last_issued = Some(seq);

        Ok(Some(SaveRequest {
            seq,
            fixture: id,
            text: current.to_string(),
            csrf_token: csrf_token.to_string(),
        }))
    }

    /// Full commit-on-blur flow for the input with `element_id`
    pub async fn on_blur(
        &self,
        element_id: &str,
        current: &str,
        csrf_token: &str,
    ) -> Result<BlurOutcome, EditorError> {
        let id = parse_fixture_id(element_id)?;
        let Some(request) = self.begin_edit(id, current, csrf_token)? else {
            return Ok(BlurOutcome::Unchanged);
        };

        log::debug!("Saving fixture {} as {:?} (request {})", id, request.text, request.seq.0);
        self.view.clear_message(id);

        let outcome = self.transport.save(&request).await;
        self.complete(&request, &outcome);
        Ok(BlurOutcome::Submitted(outcome))
    }

    /// Apply a response to the field that produced `request`.
    ///
    /// No response is ever dropped: a late answer to an older request still
    /// overwrites the field. It is counted and logged so the race is visible.
    pub fn complete(&self, request: &SaveRequest, outcome: &SaveOutcome) {
        let id = request.fixture;
        let original = {
            let mut fields = self.fields.borrow_mut();
            let Some(field) = fields.get_mut(&id) else {
                log::warn!("Response for unregistered fixture {}", id);
                return;
            };

            if field.last_issued != Some(request.seq) {
                self.stale_responses.set(self.stale_responses.get() + 1);
                log::warn!(
                    "Stale response for fixture {}: request {} answered after {:?}",
                    id,
                    request.seq.0,
                    field.last_issued.map(|seq| seq.0)
                );
            }
            if field.pending == Some(request.seq) {
                field.pending = None;
            }

            match outcome {
                SaveOutcome::Saved { text, .. } => {
                    field.displayed = text.clone();
                    field.original = text.clone();
                }
                SaveOutcome::ValidationFailed(_) => {
                    field.displayed = field.original.clone();
                }
                SaveOutcome::TransportFailed { .. } => {}
            }
            field.original.clone()
        };

        // View calls may move focus and fire further blurs; no borrow held here.
        match outcome {
            SaveOutcome::Saved { text, info } => {
                self.view.set_text(id, text);
                self.view.set_original(id, text);
                if let Some(info) = info {
                    self.view.show_info(id, info);
                }
            }
            SaveOutcome::ValidationFailed(message) => {
                log::info!("Fixture {} rejected: {}", id, message);
                self.view.show_error(id, message);
                self.view.set_text(id, &original);
                self.view.focus(id);
            }
            SaveOutcome::TransportFailed { status, description } => {
                log::error!("Saving fixture {} failed: {} {}", id, status, description);
                self.view.notify_failure(*status, description);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use futures::task::noop_waker;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::task::{Context, Poll};

    #[derive(Debug, Clone, PartialEq)]
    enum ViewCall {
        SetText(FixtureId, String),
        SetOriginal(FixtureId, String),
        ClearMessage(FixtureId),
        ShowError(FixtureId, String),
        ShowInfo(FixtureId, String),
        Focus(FixtureId),
        NotifyFailure(u16, String),
    }

    #[derive(Default)]
    struct RecordingView {
        calls: RefCell<Vec<ViewCall>>,
    }

    impl RecordingView {
        fn calls(&self) -> Vec<ViewCall> {
            self.calls.borrow().clone()
        }
    }

    impl FieldView for RecordingView {
        fn set_text(&self, id: FixtureId, text: &str) {
            self.calls.borrow_mut().push(ViewCall::SetText(id, text.to_string()));
        }
        fn set_original(&self, id: FixtureId, text: &str) {
            self.calls.borrow_mut().push(ViewCall::SetOriginal(id, text.to_string()));
        }
        fn clear_message(&self, id: FixtureId) {
            self.calls.borrow_mut().push(ViewCall::ClearMessage(id));
        }
        fn show_error(&self, id: FixtureId, message: &str) {
            self.calls.borrow_mut().push(ViewCall::ShowError(id, message.to_string()));
        }
        fn show_info(&self, id: FixtureId, message: &str) {
            self.calls.borrow_mut().push(ViewCall::ShowInfo(id, message.to_string()));
        }
        fn focus(&self, id: FixtureId) {
            self.calls.borrow_mut().push(ViewCall::Focus(id));
        }
        fn notify_failure(&self, status: u16, description: &str) {
            self.calls
                .borrow_mut()
                .push(ViewCall::NotifyFailure(status, description.to_string()));
        }
    }

    /// Answers each request with the next queued outcome
    #[derive(Default)]
    struct ScriptedTransport {
        replies: RefCell<VecDeque<SaveOutcome>>,
        requests: RefCell<Vec<SaveRequest>>,
    }

    impl ScriptedTransport {
        fn replying(replies: Vec<SaveOutcome>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                requests: RefCell::default(),
            }
        }
    }

    #[async_trait(?Send)]
    impl SaveTransport for ScriptedTransport {
        async fn save(&self, request: &SaveRequest) -> SaveOutcome {
            self.requests.borrow_mut().push(request.clone());
            self.replies
                .borrow_mut()
                .pop_front()
                .expect("no scripted reply left")
        }
    }

    /// Answers each request whenever the test sends on its channel
    struct DeferredTransport {
        replies: RefCell<VecDeque<oneshot::Receiver<SaveOutcome>>>,
    }

    #[async_trait(?Send)]
    impl SaveTransport for DeferredTransport {
        async fn save(&self, _request: &SaveRequest) -> SaveOutcome {
            let reply = self.replies.borrow_mut().pop_front().expect("no reply channel left");
            reply.await.expect("reply sender dropped")
        }
    }

    fn editor_with(replies: Vec<SaveOutcome>) -> InlineEditor<ScriptedTransport, RecordingView> {
        let editor = InlineEditor::new(ScriptedTransport::replying(replies), RecordingView::default());
        editor.register(FixtureId(21), "1-0");
        editor
    }

    fn saved(text: &str) -> SaveOutcome {
        SaveOutcome::Saved {
            text: text.to_string(),
            info: None,
        }
    }

    #[test]
    fn unchanged_text_sends_nothing() {
        let editor = editor_with(vec![]);

        let outcome = block_on(editor.on_blur("fixture_21", "1-0", "token")).unwrap();

        assert_eq!(outcome, BlurOutcome::Unchanged);
        assert!(editor.transport.requests.borrow().is_empty());
        assert!(editor.view().calls().is_empty());
    }

    #[test]
    fn whitespace_difference_counts_as_an_edit() {
        let editor = editor_with(vec![saved("1 - 0")]);

        block_on(editor.on_blur("fixture_21", "1-0 ", "token")).unwrap();

        assert_eq!(editor.transport.requests.borrow().len(), 1);
        assert_eq!(editor.field(FixtureId(21)).unwrap().original, "1 - 0");
    }

    #[test]
    fn validation_error_reverts_and_refocuses() {
        let editor = editor_with(vec![SaveOutcome::ValidationFailed("invalid format".to_string())]);

        let outcome = block_on(editor.on_blur("fixture_21", "2:1", "token")).unwrap();

        let requests = editor.transport.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].fixture, FixtureId(21));
        assert_eq!(requests[0].text, "2:1");
        assert_eq!(requests[0].csrf_token, "token");

        assert_eq!(
            outcome,
            BlurOutcome::Submitted(SaveOutcome::ValidationFailed("invalid format".to_string()))
        );
        assert_eq!(
            editor.view().calls(),
            vec![
                ViewCall::ClearMessage(FixtureId(21)),
                ViewCall::ShowError(FixtureId(21), "invalid format".to_string()),
                ViewCall::SetText(FixtureId(21), "1-0".to_string()),
                ViewCall::Focus(FixtureId(21)),
            ]
        );
        let field = editor.field(FixtureId(21)).unwrap();
        assert_eq!(field.displayed, "1-0");
        assert_eq!(field.original, "1-0");
        assert_eq!(field.pending, None);
    }

    #[test]
    fn refocus_after_rejection_does_not_resubmit() {
        let editor = editor_with(vec![SaveOutcome::ValidationFailed("invalid format".to_string())]);

        block_on(editor.on_blur("fixture_21", "2:1", "token")).unwrap();
        // The reverted field loses focus again without being touched
        let outcome = block_on(editor.on_blur("fixture_21", "1-0", "token")).unwrap();

        assert_eq!(outcome, BlurOutcome::Unchanged);
        assert_eq!(editor.transport.requests.borrow().len(), 1);
    }

    #[test]
    fn save_syncs_displayed_and_original_to_canonical_text() {
        let editor = editor_with(vec![saved("2-1")]);

        block_on(editor.on_blur("fixture_21", "2-1", "token")).unwrap();

        let field = editor.field(FixtureId(21)).unwrap();
        assert_eq!(field.displayed, "2-1");
        assert_eq!(field.original, "2-1");
        assert_eq!(
            editor.view().calls(),
            vec![
                ViewCall::ClearMessage(FixtureId(21)),
                ViewCall::SetText(FixtureId(21), "2-1".to_string()),
                ViewCall::SetOriginal(FixtureId(21), "2-1".to_string()),
            ]
        );
    }

    #[test]
    fn server_formatting_wins() {
        let editor = editor_with(vec![SaveOutcome::Saved {
            text: "2 - 1".to_string(),
            info: Some("Prediction saved".to_string()),
        }]);

        block_on(editor.on_blur("fixture_21", "2v1", "token")).unwrap();

        let field = editor.field(FixtureId(21)).unwrap();
        assert_eq!(field.displayed, "2 - 1");
        assert_eq!(field.original, "2 - 1");
        assert!(editor
            .view()
            .calls()
            .contains(&ViewCall::ShowInfo(FixtureId(21), "Prediction saved".to_string())));

        // Blurring with the canonical text is now a no-op
        let outcome = block_on(editor.on_blur("fixture_21", "2 - 1", "token")).unwrap();
        assert_eq!(outcome, BlurOutcome::Unchanged);
    }

    #[test]
    fn transport_failure_notifies_and_leaves_original() {
        let editor = editor_with(vec![SaveOutcome::TransportFailed {
            status: 500,
            description: "Internal Server Error".to_string(),
        }]);

        block_on(editor.on_blur("fixture_21", "2-1", "token")).unwrap();

        let field = editor.field(FixtureId(21)).unwrap();
        assert_eq!(field.original, "1-0");
        assert_eq!(field.displayed, "2-1");
        assert_eq!(field.pending, None);
        assert_eq!(
            editor.view().calls(),
            vec![
                ViewCall::ClearMessage(FixtureId(21)),
                ViewCall::NotifyFailure(500, "Internal Server Error".to_string()),
            ]
        );
    }

    #[test]
    fn unknown_and_malformed_fields_are_errors() {
        let editor = editor_with(vec![]);

        assert_eq!(
            block_on(editor.on_blur("fixture_99", "1-1", "token")),
            Err(EditorError::UnknownField(FixtureId(99)))
        );
        assert_eq!(
            block_on(editor.on_blur("fixture", "1-1", "token")),
            Err(EditorError::BadFieldId("fixture".to_string()))
        );
    }

    #[test]
    fn pending_is_set_while_request_is_in_flight() {
        let (tx, rx) = oneshot::channel();
        let editor = InlineEditor::new(
            DeferredTransport {
                replies: RefCell::new(VecDeque::from(vec![rx])),
            },
            RecordingView::default(),
        );
        editor.register(FixtureId(21), "1-0");

        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        let mut blur = Box::pin(editor.on_blur("fixture_21", "2-1", "token"));

        assert!(blur.as_mut().poll(&mut cx).is_pending());
        let field = editor.field(FixtureId(21)).unwrap();
        assert_eq!(field.pending, Some(RequestSeq(1)));
        assert_eq!(field.original, "1-0");

        tx.send(saved("2-1")).unwrap();
        assert!(matches!(blur.as_mut().poll(&mut cx), Poll::Ready(Ok(_))));
        assert_eq!(editor.field(FixtureId(21)).unwrap().pending, None);
    }

    #[test]
    fn late_response_to_older_request_still_overwrites() {
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        let editor = InlineEditor::new(
            DeferredTransport {
                replies: RefCell::new(VecDeque::from(vec![first_rx, second_rx])),
            },
            RecordingView::default(),
        );
        editor.register(FixtureId(21), "1-0");

        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        let mut first = Box::pin(editor.on_blur("fixture_21", "2-1", "token"));
        assert!(first.as_mut().poll(&mut cx).is_pending());
        let mut second = Box::pin(editor.on_blur("fixture_21", "3-1", "token"));
        assert!(second.as_mut().poll(&mut cx).is_pending());

        second_tx.send(saved("3 - 1")).unwrap();
        assert!(second.as_mut().poll(&mut cx).is_ready());
        assert_eq!(editor.stale_responses(), 0);

        first_tx.send(saved("2 - 1")).unwrap();
        assert!(first.as_mut().poll(&mut cx).is_ready());

        let field = editor.field(FixtureId(21)).unwrap();
        assert_eq!(field.original, "2 - 1");
        assert_eq!(field.displayed, "2 - 1");
        assert_eq!(field.pending, None);
        assert_eq!(editor.stale_responses(), 1);
    }
}
