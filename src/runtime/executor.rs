//! Session runtime executor

use super::traits::ViewNotifier;
use super::{
    Command, InputOutcome, SessionContext, SessionEvent, SessionSnapshot, StageOutcome,
    SubmitOutcome,
};

use crate::responder::Responder;
use crate::session::{
    can_submit, validate, AttachmentCandidate, Composer, MessageLog, Validation, QUICK_PROMPTS,
};
use crate::state_machine::{transition, Effect, Event, SessionState, TransitionError};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

/// Generic session runtime that can work with any responder and view notifier
pub struct SessionRuntime<R, N>
where
    R: Responder + 'static,
    N: ViewNotifier,
{
    context: SessionContext,
    state: SessionState,
    log: MessageLog,
    composer: Composer,
    responder: Arc<R>,
    notifier: N,
    command_rx: mpsc::Receiver<Command>,
    /// Responder results come back through here
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl<R, N> SessionRuntime<R, N>
where
    R: Responder + 'static,
    N: ViewNotifier,
{
    pub fn new(
        context: SessionContext,
        responder: R,
        notifier: N,
        command_rx: mpsc::Receiver<Command>,
        broadcast_tx: broadcast::Sender<SessionEvent>,
    ) -> Self {
        let log = MessageLog::seeded(context.greeting.clone());
        let composer = Composer::new();
        let state = SessionState::Idle;
        let (snapshot_tx, _) = watch::channel(SessionSnapshot {
            session_id: context.session_id.clone(),
            state,
            busy: state.is_busy(),
            messages: log.snapshot().to_vec(),
            staged: None,
            input: String::new(),
        });
        let (event_tx, event_rx) = mpsc::channel(8);

        Self {
            context,
            state,
            log,
            composer,
            responder: Arc::new(responder),
            notifier,
            command_rx,
            event_rx,
            event_tx,
            broadcast_tx,
            snapshot_tx,
        }
    }

    pub fn subscribe_snapshots(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.context.session_id, "Starting session runtime");

        // The seeded greeting is the first append
        self.notifier.on_change(self.log.snapshot());

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(Command::End) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(event) = self.event_rx.recv() => {
                    if let Err(e) = self.process_event(event) {
                        tracing::error!(
                            session_id = %self.context.session_id,
                            error = %e,
                            "Error handling responder event"
                        );
                    }
                }
            }
        }

        if self.state.is_busy() {
            tracing::info!(
                session_id = %self.context.session_id,
                "Session ended with a reply pending; it will be discarded"
            );
        }
        tracing::info!(
            session_id = %self.context.session_id,
            messages = self.log.len(),
            "Session runtime stopped"
        );
    }

    fn handle_command(&mut self, command: Command) {
        // A dropped reply receiver only means the caller stopped waiting
        match command {
            Command::SetInput { text, reply } => {
                let outcome = self.set_input(text);
                let _ = reply.send(outcome);
            }
            Command::UseQuickPrompt { index, reply } => {
                let outcome = match QUICK_PROMPTS.get(index) {
                    Some(prompt) => self.set_input(*prompt),
                    None => InputOutcome::UnknownPrompt,
                };
                let _ = reply.send(outcome);
            }
            Command::StageAttachment { candidate, reply } => {
                let outcome = self.stage_attachment(candidate);
                let _ = reply.send(outcome);
            }
            Command::RemoveAttachment { reply } => {
                let removed = self.composer.remove_staged();
                if removed.is_some() {
                    self.publish_snapshot();
                }
                let _ = reply.send(removed);
            }
            Command::Submit { text, reply } => {
                let outcome = self.submit(text);
                let _ = reply.send(outcome);
            }
            Command::End => {}
        }
    }

    fn set_input(&mut self, text: impl Into<String>) -> InputOutcome {
        if self.state.is_busy() {
            tracing::debug!(
                session_id = %self.context.session_id,
                "Ignoring input edit while a reply is pending"
            );
            return InputOutcome::Busy;
        }
        self.composer.set_input(text);
        self.publish_snapshot();
        InputOutcome::Applied
    }

    fn stage_attachment(&mut self, candidate: AttachmentCandidate) -> StageOutcome {
        if self.state.is_busy() {
            tracing::debug!(
                session_id = %self.context.session_id,
                name = %candidate.name,
                "Ignoring attachment while a reply is pending"
            );
            return StageOutcome::Busy;
        }

        match validate(&candidate) {
            Validation::Accepted(attachment) => {
                let replaced = self.composer.stage(attachment.clone());
                tracing::info!(
                    session_id = %self.context.session_id,
                    name = %attachment.name,
                    media_type = %attachment.media_type,
                    replaced = replaced.is_some(),
                    "Attachment staged"
                );
                self.publish_snapshot();
                StageOutcome::Staged {
                    attachment,
                    replaced,
                }
            }
            Validation::Rejected(rejection) => {
                tracing::warn!(
                    session_id = %self.context.session_id,
                    name = %rejection.name,
                    media_type = %rejection.media_type,
                    "Attachment rejected"
                );
                let _ = self.broadcast_tx.send(SessionEvent::AttachmentRejected {
                    name: rejection.name.clone(),
                    media_type: rejection.media_type.clone(),
                });
                StageOutcome::Rejected(rejection)
            }
        }
    }

    fn submit(&mut self, text: Option<String>) -> SubmitOutcome {
        // A closed gate leaves the composer untouched
        let input = text.as_deref().unwrap_or(self.composer.input());
        if !can_submit(input, self.composer.staged(), self.state.is_busy()) {
            tracing::debug!(
                session_id = %self.context.session_id,
                busy = self.state.is_busy(),
                "Submission gate closed, ignoring"
            );
            return SubmitOutcome::Ignored;
        }

        if let Some(text) = text {
            self.composer.set_input(text);
        }

        let turn = self.composer.turn();
        match self.process_event(Event::UserSubmit { turn }) {
            Ok(()) => match self.log.latest() {
                Some(message) => SubmitOutcome::Accepted {
                    message_id: message.id,
                },
                None => SubmitOutcome::Ignored,
            },
            Err(e) => {
                tracing::debug!(session_id = %self.context.session_id, error = %e, "Submission rejected");
                SubmitOutcome::Ignored
            }
        }
    }

    fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        // Pure state transition
        let result = transition(&self.state, event)?;

        let old_state = std::mem::replace(&mut self.state, result.new_state);
        if old_state != self.state {
            tracing::debug!(
                session_id = %self.context.session_id,
                from = old_state.name(),
                to = self.state.name(),
                "State transition"
            );
        }

        for effect in result.effects {
            self.execute_effect(effect);
        }
        Ok(())
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::AppendMessage { entry } => {
                let message = self.log.append(entry).clone();
                tracing::info!(
                    session_id = %self.context.session_id,
                    message_id = %message.id,
                    role = %message.role,
                    has_attachment = message.attachment.is_some(),
                    "Message appended"
                );
                let _ = self.broadcast_tx.send(SessionEvent::Message { message });
                self.notifier.on_change(self.log.snapshot());
            }

            Effect::ClearComposer => self.composer.clear(),

            Effect::RequestResponse { turn } => {
                let responder = self.responder.clone();
                let event_tx = self.event_tx.clone();
                let session_id = self.context.session_id.clone();

                tokio::spawn(async move {
                    tracing::debug!(session_id = %session_id, responder = %responder.name(), "Requesting reply (background)");

                    let event = match responder.respond(&turn).await {
                        Ok(reply) => Event::ResponseReady { reply },
                        Err(e) => Event::ResponseFailed {
                            message: e.message,
                            kind: e.kind,
                        },
                    };
                    if event_tx.send(event).await.is_err() {
                        tracing::debug!(session_id = %session_id, "Session gone before reply arrived");
                    }
                });
            }

            Effect::PublishSnapshot => self.publish_snapshot(),

            Effect::NotifyFailure { message, retryable } => {
                let _ = self
                    .broadcast_tx
                    .send(SessionEvent::ResponseFailed { message, retryable });
            }
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.context.session_id.clone(),
            state: self.state,
            busy: self.state.is_busy(),
            messages: self.log.snapshot().to_vec(),
            staged: self.composer.staged().cloned(),
            input: self.composer.input().to_string(),
        }
    }

    fn publish_snapshot(&self) {
        let snapshot = self.snapshot();
        self.snapshot_tx.send_replace(snapshot.clone());
        let _ = self.broadcast_tx.send(SessionEvent::Snapshot { snapshot });
    }
}
