//! Runtime for executing sessions
//!
//! Each session is one task owning its state machine, composer and message
//! log. Callers talk to it through a [`SessionHandle`].

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;
pub use traits::*;

use crate::responder::Responder;
use crate::session::{Attachment, AttachmentCandidate, Message, MessageId, UnsupportedMediaType};
use crate::state_machine::SessionState;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch, RwLock};
use tokio::time::Instant;

/// Type alias for production runtime with concrete implementations
pub type ProductionRuntime = SessionRuntime<Arc<dyn Responder>, BroadcastNotifier>;

/// Immutable configuration of one session
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: String,
    pub greeting: String,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>, greeting: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            greeting: greeting.into(),
        }
    }
}

/// Read model handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub state: SessionState,
    pub busy: bool,
    pub messages: Vec<Message>,
    pub staged: Option<Attachment>,
    pub input: String,
}

/// Events sent to session subscribers
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Snapshot { snapshot: SessionSnapshot },
    Message { message: Message },
    /// Bring this entry into view
    ScrollToLatest { message_id: MessageId },
    AttachmentRejected { name: String, media_type: String },
    ResponseFailed { message: String, retryable: bool },
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Snapshot { .. } => "snapshot",
            SessionEvent::Message { .. } => "message",
            SessionEvent::ScrollToLatest { .. } => "scroll_to_latest",
            SessionEvent::AttachmentRejected { .. } => "attachment_rejected",
            SessionEvent::ResponseFailed { .. } => "response_failed",
        }
    }
}

/// Requests handled by the session task, each answered on its `reply` channel
#[derive(Debug)]
pub enum Command {
    SetInput {
        text: String,
        reply: oneshot::Sender<InputOutcome>,
    },
    UseQuickPrompt {
        index: usize,
        reply: oneshot::Sender<InputOutcome>,
    },
    StageAttachment {
        candidate: AttachmentCandidate,
        reply: oneshot::Sender<StageOutcome>,
    },
    RemoveAttachment {
        reply: oneshot::Sender<Option<Attachment>>,
    },
    Submit {
        text: Option<String>,
        reply: oneshot::Sender<SubmitOutcome>,
    },
    End,
}

/// Result of offering a file to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Staged {
        attachment: Attachment,
        replaced: Option<Attachment>,
    },
    Rejected(UnsupportedMediaType),
    /// The attach control is disabled while a reply is pending
    Busy,
}

/// Result of editing the draft input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Applied,
    /// The input is disabled while a reply is pending
    Busy,
    /// No quick prompt at that index
    UnknownPrompt,
}

impl InputOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, InputOutcome::Applied)
    }
}

/// Result of a submit request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted { message_id: MessageId },
    /// Gate was closed: blank input with nothing staged, or a reply is pending
    Ignored,
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted { .. })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session {0} has ended")]
    Closed(String),
    #[error("session not found: {0}")]
    NotFound(String),
}

/// Handle to interact with a running session
#[derive(Clone, Debug)]
pub struct SessionHandle {
    session_id: String,
    command_tx: mpsc::Sender<Command>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    pub fn id(&self) -> &str {
        &self.session_id
    }

    /// Latest published read model
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Live event streams on this session
    pub fn subscriber_count(&self) -> usize {
        self.broadcast_tx.receiver_count()
    }

    pub async fn set_input(&self, text: impl Into<String>) -> Result<InputOutcome, SessionError> {
        let text = text.into();
        self.request(|reply| Command::SetInput { text, reply }).await
    }

    pub async fn use_quick_prompt(&self, index: usize) -> Result<InputOutcome, SessionError> {
        self.request(|reply| Command::UseQuickPrompt { index, reply })
            .await
    }

    pub async fn stage_attachment(
        &self,
        candidate: AttachmentCandidate,
    ) -> Result<StageOutcome, SessionError> {
        self.request(|reply| Command::StageAttachment { candidate, reply })
            .await
    }

    pub async fn remove_attachment(&self) -> Result<Option<Attachment>, SessionError> {
        self.request(|reply| Command::RemoveAttachment { reply }).await
    }

    /// Submit the composer, optionally with new input text
    ///
    /// The text only replaces the draft when the submission is accepted.
    pub async fn submit(&self, text: Option<String>) -> Result<SubmitOutcome, SessionError> {
        self.request(|reply| Command::Submit { text, reply }).await
    }

    /// Stop the session task; the log is discarded
    pub async fn end(&self) {
        // Already stopped is fine
        let _ = self.command_tx.send(Command::End).await;
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, SessionError> {
        let (reply, response) = oneshot::channel();
        self.command_tx
            .send(build(reply))
            .await
            .map_err(|_| SessionError::Closed(self.session_id.clone()))?;
        response
            .await
            .map_err(|_| SessionError::Closed(self.session_id.clone()))
    }
}

/// Start a session task and return its handle
pub fn spawn_session<R, N>(
    context: SessionContext,
    responder: R,
    notifier: N,
    broadcast_tx: broadcast::Sender<SessionEvent>,
) -> (SessionHandle, tokio::task::JoinHandle<()>)
where
    R: Responder + 'static,
    N: ViewNotifier + 'static,
{
    let (command_tx, command_rx) = mpsc::channel(32);
    let session_id = context.session_id.clone();

    let runtime = SessionRuntime::new(context, responder, notifier, command_rx, broadcast_tx.clone());
    let snapshot_rx = runtime.subscribe_snapshots();

    let join = tokio::spawn(async move {
        runtime.run().await;
    });

    let handle = SessionHandle {
        session_id,
        command_tx,
        broadcast_tx,
        snapshot_rx,
    };
    (handle, join)
}

/// A registered session and when a caller last asked for it
struct SessionEntry {
    handle: SessionHandle,
    last_active: Instant,
}

/// Manager for all open sessions
pub struct SessionManager {
    responder: Arc<dyn Responder>,
    greeting: String,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionManager {
    pub fn new(responder: Arc<dyn Responder>, greeting: impl Into<String>) -> Self {
        Self {
            responder,
            greeting: greeting.into(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Open a new session seeded with the greeting
    pub async fn create(&self) -> SessionHandle {
        let session_id = uuid::Uuid::new_v4().to_string();
        let context = SessionContext::new(&session_id, &self.greeting);
        let (broadcast_tx, _) = broadcast::channel(128);

        let (handle, _join) = spawn_session(
            context,
            self.responder.clone(),
            BroadcastNotifier::new(broadcast_tx.clone()),
            broadcast_tx,
        );

        self.sessions.write().await.insert(
            session_id.clone(),
            SessionEntry {
                handle: handle.clone(),
                last_active: Instant::now(),
            },
        );
        tracing::info!(session_id = %session_id, responder = %self.responder.name(), "Session created");
        handle
    }

    /// Look a session up, marking it active
    pub async fn get(&self, session_id: &str) -> Result<SessionHandle, SessionError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        entry.last_active = Instant::now();
        Ok(entry.handle.clone())
    }

    /// Tear a session down; its history is gone afterwards
    pub async fn end(&self, session_id: &str) -> Result<(), SessionError> {
        let entry = self
            .sessions
            .write()
            .await
            .remove(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        entry.handle.end().await;
        tracing::info!(session_id = %session_id, "Session ended");
        Ok(())
    }

    /// End sessions nobody has touched for `max_idle` and nobody is streaming
    pub async fn reap_idle(&self, max_idle: Duration) -> usize {
        let expired: Vec<SessionEntry> = {
            let mut sessions = self.sessions.write().await;
            let ids: Vec<String> = sessions
                .iter()
                .filter(|(_, entry)| {
                    entry.last_active.elapsed() >= max_idle && entry.handle.subscriber_count() == 0
                })
                .map(|(id, _)| id.clone())
                .collect();
            ids.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        for entry in &expired {
            entry.handle.end().await;
            tracing::info!(session_id = %entry.handle.id(), "Idle session ended");
        }
        expired.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
