//! Mock implementations for testing
//!
//! These mocks enable integration testing of the session runtime without a
//! real backend or view.

use super::traits::ViewNotifier;
use super::{spawn_session, SessionContext, SessionEvent, SessionHandle, SessionSnapshot};
use crate::responder::{compose_reply, Responder, ResponderError};
use crate::session::{AssistantReply, Message, MessageId, UserTurn, DEFAULT_GREETING};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Semaphore};

// ============================================================================
// Mock Responder
// ============================================================================

/// Responder that returns queued results, falling back to the demo reply
pub struct MockResponder {
    results: Mutex<VecDeque<Result<AssistantReply, ResponderError>>>,
    /// Record of all turns received
    pub turns: Mutex<Vec<UserTurn>>,
}

impl MockResponder {
    pub fn new() -> Self {
        Self {
            results: Mutex::new(VecDeque::new()),
            turns: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_reply(&self, text: impl Into<String>) {
        self.results
            .lock()
            .unwrap()
            .push_back(Ok(AssistantReply::new(text)));
    }

    pub fn queue_error(&self, error: ResponderError) {
        self.results.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_turns(&self) -> Vec<UserTurn> {
        self.turns.lock().unwrap().clone()
    }
}

impl Default for MockResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Responder for MockResponder {
    async fn respond(&self, turn: &UserTurn) -> Result<AssistantReply, ResponderError> {
        self.turns.lock().unwrap().push(turn.clone());
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(AssistantReply::new(compose_reply(turn))))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Gated Responder (for re-entrancy testing)
// ============================================================================

/// Responder that holds every reply until the test releases it
pub struct GatedResponder {
    gate: Semaphore,
    pub turns: Mutex<Vec<UserTurn>>,
}

impl GatedResponder {
    pub fn new() -> Self {
        Self {
            gate: Semaphore::new(0),
            turns: Mutex::new(Vec::new()),
        }
    }

    /// Let one pending (or future) request complete
    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn request_count(&self) -> usize {
        self.turns.lock().unwrap().len()
    }
}

#[async_trait]
impl Responder for GatedResponder {
    async fn respond(&self, turn: &UserTurn) -> Result<AssistantReply, ResponderError> {
        self.turns.lock().unwrap().push(turn.clone());
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| ResponderError::unknown("gate closed"))?;
        permit.forget();
        Ok(AssistantReply::new(compose_reply(turn)))
    }

    fn name(&self) -> &str {
        "gated"
    }
}

// ============================================================================
// Recording View Notifier
// ============================================================================

/// Records the id of the newest entry on every notification
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub calls: Arc<Mutex<Vec<MessageId>>>,
}

impl RecordingNotifier {
    pub fn recorded(&self) -> Vec<MessageId> {
        self.calls.lock().unwrap().clone()
    }
}

impl ViewNotifier for RecordingNotifier {
    fn on_change(&self, messages: &[Message]) {
        if let Some(latest) = messages.last() {
            self.calls.lock().unwrap().push(latest.id);
        }
    }
}

// ============================================================================
// Test Session Builder
// ============================================================================

/// A running session wired to test doubles
pub struct TestSession<R: Responder + 'static> {
    pub handle: SessionHandle,
    pub responder: Arc<R>,
    pub notifier: RecordingNotifier,
    pub events: broadcast::Receiver<SessionEvent>,
    _runtime_handle: tokio::task::JoinHandle<()>,
}

impl TestSession<MockResponder> {
    pub fn new() -> Self {
        Self::with_responder(MockResponder::new())
    }
}

impl<R: Responder + 'static> TestSession<R> {
    pub fn with_responder(responder: R) -> Self {
        let responder = Arc::new(responder);
        let notifier = RecordingNotifier::default();
        let (broadcast_tx, events) = broadcast::channel(128);

        let (handle, join) = spawn_session(
            SessionContext::new("test-session", DEFAULT_GREETING),
            responder.clone(),
            notifier.clone(),
            broadcast_tx,
        );

        Self {
            handle,
            responder,
            notifier,
            events,
            _runtime_handle: join,
        }
    }

    /// Wait until the log holds `count` entries and no reply is pending
    pub async fn wait_for_messages(&self, count: usize, timeout: Duration) -> Option<SessionSnapshot> {
        let mut rx = self.handle.watch();
        let waited = tokio::time::timeout(
            timeout,
            rx.wait_for(|s| s.messages.len() >= count && !s.busy),
        )
        .await;
        match waited {
            Ok(Ok(snapshot)) => Some(snapshot.clone()),
            _ => None,
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        self.handle.snapshot().messages
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::ResponderErrorKind;
    use crate::runtime::{InputOutcome, StageOutcome, SubmitOutcome};
    use crate::session::{AttachmentCandidate, Role, QUICK_PROMPTS};
    use crate::state_machine::SessionState;

    const WAIT: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn test_mock_responder() {
        let mock = MockResponder::new();
        mock.queue_reply("queued");
        mock.queue_error(ResponderError::network("offline"));

        let turn = UserTurn::new("Hello", None);
        assert_eq!(mock.respond(&turn).await.unwrap().text, "queued");
        assert_eq!(
            mock.respond(&turn).await.unwrap_err().kind,
            ResponderErrorKind::Network
        );
        // Queue exhausted falls back to the demo reply
        assert!(mock.respond(&turn).await.unwrap().text.contains("\"Hello\""));
        assert_eq!(mock.recorded_turns().len(), 3);
    }

    #[tokio::test]
    async fn test_session_starts_with_greeting() {
        let session = TestSession::new();
        let snapshot = session.handle.snapshot();
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.messages[0].role, Role::Assistant);
        assert_eq!(
            snapshot.messages[0].content,
            "Hello! I'm your AI assistant. How can I help you today?"
        );
        assert_eq!(snapshot.state, SessionState::Idle);
        assert!(!snapshot.busy);
    }

    #[tokio::test]
    async fn test_text_round_trip() {
        let session = TestSession::new();

        let outcome = session.handle.submit(Some("Hello".to_string())).await.unwrap();
        assert!(outcome.is_accepted());

        let snapshot = session.wait_for_messages(3, WAIT).await.unwrap();
        let user = &snapshot.messages[1];
        assert_eq!(user.role, Role::User);
        assert_eq!(user.content, "Hello");
        let assistant = &snapshot.messages[2];
        assert_eq!(assistant.role, Role::Assistant);
        assert_eq!(
            assistant.content,
            "I received your message: \"Hello\". This is a demo response. In a production app, this would be powered by a real AI model."
        );
        assert_eq!(snapshot.input, "");
    }

    #[tokio::test]
    async fn test_pdf_only_submission() {
        let session = TestSession::new();

        let staged = session
            .handle
            .stage_attachment(AttachmentCandidate::new("notes.pdf", "application/pdf"))
            .await
            .unwrap();
        assert!(matches!(staged, StageOutcome::Staged { replaced: None, .. }));
        assert!(session.handle.snapshot().staged.is_some());

        assert!(session.handle.submit(None).await.unwrap().is_accepted());
        let snapshot = session.wait_for_messages(3, WAIT).await.unwrap();

        let user = &snapshot.messages[1];
        assert_eq!(user.content, "Uploaded a file");
        assert_eq!(user.attachment.as_ref().unwrap().name, "notes.pdf");
        assert_eq!(
            snapshot.messages[2].content,
            "I received your PDF file \"notes.pdf\". In a production app, I would analyze this file using AI."
        );
        assert!(snapshot.messages[2].attachment.is_none());
        assert!(snapshot.staged.is_none());
    }

    #[tokio::test]
    async fn test_audio_with_text_submission() {
        let session = TestSession::new();

        session.handle.set_input("Summarize").await.unwrap();
        session
            .handle
            .stage_attachment(AttachmentCandidate::new("memo.wav", "audio/wav"))
            .await
            .unwrap();
        assert!(session.handle.submit(None).await.unwrap().is_accepted());

        let snapshot = session.wait_for_messages(3, WAIT).await.unwrap();
        assert_eq!(snapshot.messages[1].content, "Summarize");
        assert!(snapshot.messages[2].content.contains(
            "I received your audio file \"memo.wav\". You also asked: \"Summarize\". In a production app, I would analyze this file using AI."
        ));

        let turns = session.responder.recorded_turns();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].attachment.as_ref().unwrap().media_type, "audio/wav");
    }

    #[tokio::test]
    async fn test_empty_submission_is_noop() {
        let session = TestSession::new();

        assert_eq!(session.handle.submit(None).await.unwrap(), SubmitOutcome::Ignored);
        assert_eq!(
            session.handle.submit(Some("   ".to_string())).await.unwrap(),
            SubmitOutcome::Ignored
        );
        assert_eq!(session.messages().len(), 1);
        assert!(session.responder.recorded_turns().is_empty());
    }

    #[tokio::test]
    async fn test_resubmit_while_awaiting_is_ignored() {
        let session = TestSession::with_responder(GatedResponder::new());

        assert!(session
            .handle
            .submit(Some("first".to_string()))
            .await
            .unwrap()
            .is_accepted());
        assert!(session.handle.snapshot().busy);

        let before = session.handle.snapshot();
        let second = session.handle.submit(Some("second".to_string())).await.unwrap();
        assert_eq!(second, SubmitOutcome::Ignored);

        // Nothing changed: greeting plus the first user entry, empty draft
        let after = session.handle.snapshot();
        assert_eq!(after, before);
        assert_eq!(after.messages.len(), 2);
        assert_eq!(after.messages[1].content, "first");
        assert_eq!(after.input, "");

        session.responder.release();
        let snapshot = session.wait_for_messages(3, WAIT).await.unwrap();
        assert_eq!(snapshot.messages.len(), 3);
        assert!(snapshot.messages[2].content.contains("\"first\""));
        assert_eq!(session.responder.request_count(), 1);

        assert!(session
            .handle
            .submit(Some("second".to_string()))
            .await
            .unwrap()
            .is_accepted());
        session.responder.release();
        let snapshot = session.wait_for_messages(5, WAIT).await.unwrap();
        assert_eq!(snapshot.messages[3].content, "second");
    }

    #[tokio::test]
    async fn test_attachment_ignored_while_busy() {
        let session = TestSession::with_responder(GatedResponder::new());
        session.handle.submit(Some("first".to_string())).await.unwrap();

        let outcome = session
            .handle
            .stage_attachment(AttachmentCandidate::new("notes.pdf", "application/pdf"))
            .await
            .unwrap();
        assert_eq!(outcome, StageOutcome::Busy);
        assert!(session.handle.snapshot().staged.is_none());
        session.responder.release();
    }

    #[tokio::test]
    async fn test_input_disabled_while_busy() {
        let session = TestSession::with_responder(GatedResponder::new());
        session.handle.submit(Some("first".to_string())).await.unwrap();
        let before = session.handle.snapshot();

        assert_eq!(session.handle.set_input("draft").await.unwrap(), InputOutcome::Busy);
        assert_eq!(session.handle.use_quick_prompt(0).await.unwrap(), InputOutcome::Busy);
        assert_eq!(session.handle.snapshot(), before);

        session.responder.release();
        session.wait_for_messages(3, WAIT).await.unwrap();
        assert!(session.handle.set_input("draft").await.unwrap().is_applied());
        assert_eq!(session.handle.snapshot().input, "draft");
    }

    #[tokio::test]
    async fn test_rejected_submit_keeps_draft() {
        let session = TestSession::new();
        session.handle.set_input("draft").await.unwrap();

        // Whitespace with nothing staged does not pass the gate
        let outcome = session.handle.submit(Some("   ".to_string())).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Ignored);
        assert_eq!(session.handle.snapshot().input, "draft");
    }

    #[tokio::test]
    async fn test_whitespace_text_with_file_is_sent_as_typed() {
        let session = TestSession::new();

        session.handle.set_input("  ").await.unwrap();
        session
            .handle
            .stage_attachment(AttachmentCandidate::new("memo.wav", "audio/wav"))
            .await
            .unwrap();
        assert!(session.handle.submit(None).await.unwrap().is_accepted());

        let snapshot = session.wait_for_messages(3, WAIT).await.unwrap();
        assert_eq!(snapshot.messages[1].content, "  ");
        assert_eq!(
            snapshot.messages[2].content,
            "I received your audio file \"memo.wav\". You also asked: \"  \". In a production app, I would analyze this file using AI."
        );
    }

    #[tokio::test]
    async fn test_failure_appends_error_and_unblocks() {
        let mock = MockResponder::new();
        mock.queue_error(ResponderError::server_error("backend exploded"));
        let mut session = TestSession::with_responder(mock);

        assert!(session.handle.submit(Some("Hello".to_string())).await.unwrap().is_accepted());
        let snapshot = session.wait_for_messages(3, WAIT).await.unwrap();

        let failure = &snapshot.messages[2];
        assert_eq!(failure.role, Role::Assistant);
        assert!(failure.is_error);
        assert!(failure.content.contains("backend exploded"));
        assert_eq!(snapshot.state, SessionState::Idle);

        let mut saw_failure = false;
        while let Ok(event) = session.events.try_recv() {
            if let SessionEvent::ResponseFailed { message, retryable } = event {
                assert_eq!(message, "backend exploded");
                assert!(retryable);
                saw_failure = true;
            }
        }
        assert!(saw_failure);

        // Gate is open again
        assert!(session.handle.submit(Some("again".to_string())).await.unwrap().is_accepted());
        let snapshot = session.wait_for_messages(5, WAIT).await.unwrap();
        assert!(!snapshot.messages[4].is_error);
    }

    #[tokio::test]
    async fn test_rejected_attachment_is_reported_not_staged() {
        let mut session = TestSession::new();

        session
            .handle
            .stage_attachment(AttachmentCandidate::new("notes.pdf", "application/pdf"))
            .await
            .unwrap();
        let outcome = session
            .handle
            .stage_attachment(AttachmentCandidate::new("photo.png", "image/png"))
            .await
            .unwrap();
        assert!(matches!(outcome, StageOutcome::Rejected(ref r) if r.media_type == "image/png"));

        // Previously staged file is untouched, no log entry
        let snapshot = session.handle.snapshot();
        assert_eq!(snapshot.staged.unwrap().name, "notes.pdf");
        assert_eq!(snapshot.messages.len(), 1);

        let mut saw_rejection = false;
        while let Ok(event) = session.events.try_recv() {
            if let SessionEvent::AttachmentRejected { name, .. } = event {
                assert_eq!(name, "photo.png");
                saw_rejection = true;
            }
        }
        assert!(saw_rejection);
    }

    #[tokio::test]
    async fn test_staging_replaces_and_removal_is_idempotent() {
        let session = TestSession::new();

        session
            .handle
            .stage_attachment(AttachmentCandidate::new("a.pdf", "application/pdf"))
            .await
            .unwrap();
        let outcome = session
            .handle
            .stage_attachment(AttachmentCandidate::new("b.mp3", "audio/mpeg"))
            .await
            .unwrap();
        match outcome {
            StageOutcome::Staged { attachment, replaced } => {
                assert_eq!(attachment.name, "b.mp3");
                assert_eq!(replaced.unwrap().name, "a.pdf");
            }
            other => panic!("expected staged, got {other:?}"),
        }

        assert_eq!(session.handle.remove_attachment().await.unwrap().unwrap().name, "b.mp3");
        assert!(session.handle.remove_attachment().await.unwrap().is_none());
        assert!(session.handle.snapshot().staged.is_none());
        assert_eq!(session.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_notifier_fires_after_every_append() {
        let session = TestSession::new();

        session.handle.submit(Some("one".to_string())).await.unwrap();
        session.wait_for_messages(3, WAIT).await.unwrap();
        session.handle.submit(Some("two".to_string())).await.unwrap();
        session.wait_for_messages(5, WAIT).await.unwrap();

        let ids: Vec<_> = session.messages().iter().map(|m| m.id).collect();
        assert_eq!(session.notifier.recorded(), ids);
    }

    #[tokio::test]
    async fn test_log_alternates_across_turns() {
        let session = TestSession::new();

        for (index, text) in ["a", "b", "c"].into_iter().enumerate() {
            session.handle.submit(Some(text.to_string())).await.unwrap();
            session.wait_for_messages(3 + index * 2, WAIT).await.unwrap();
        }

        let roles: Vec<_> = session.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            [
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant
            ]
        );
    }

    #[tokio::test]
    async fn test_quick_prompt_sets_input() {
        let session = TestSession::new();

        assert!(session.handle.use_quick_prompt(2).await.unwrap().is_applied());
        assert_eq!(session.handle.snapshot().input, QUICK_PROMPTS[2]);
        assert_eq!(
            session.handle.use_quick_prompt(QUICK_PROMPTS.len()).await.unwrap(),
            InputOutcome::UnknownPrompt
        );
        assert_eq!(session.handle.snapshot().input, QUICK_PROMPTS[2]);
        assert_eq!(session.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_ended_session_rejects_commands() {
        let session = TestSession::new();
        session.handle.end().await;

        let result = session.handle.set_input("hello").await;
        assert_eq!(
            result.unwrap_err(),
            crate::runtime::SessionError::Closed("test-session".to_string())
        );
    }
}
