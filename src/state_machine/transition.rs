//! Pure state transition function

use super::{Effect, Event, SessionState};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A reply is still pending, cannot accept another submission")]
    Busy,
    #[error("Nothing to submit: the message is blank and no file is attached")]
    EmptySubmission,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(state: &SessionState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Idle + UserSubmit -> AwaitingResponse
        (SessionState::Idle, Event::UserSubmit { turn }) => {
            if turn.is_empty() {
                return Err(TransitionError::EmptySubmission);
            }
            Ok(TransitionResult::new(SessionState::AwaitingResponse)
                .with_effect(Effect::append_user_turn(&turn))
                .with_effect(Effect::ClearComposer)
                .with_effect(Effect::PublishSnapshot)
                .with_effect(Effect::request_response(turn)))
        }

        (SessionState::AwaitingResponse, Event::UserSubmit { .. }) => Err(TransitionError::Busy),

        // AwaitingResponse + ResponseReady -> Idle
        (SessionState::AwaitingResponse, Event::ResponseReady { reply }) => {
            Ok(TransitionResult::new(SessionState::Idle)
                .with_effect(Effect::append_reply(reply))
                .with_effect(Effect::PublishSnapshot))
        }

        // AwaitingResponse + ResponseFailed -> Idle, so the gate never stays shut
        (SessionState::AwaitingResponse, Event::ResponseFailed { message, kind }) => {
            Ok(TransitionResult::new(SessionState::Idle)
                .with_effect(Effect::append_failure(&message))
                .with_effect(Effect::NotifyFailure {
                    message,
                    retryable: kind.is_retryable(),
                })
                .with_effect(Effect::PublishSnapshot))
        }

        // Assistant entries are never unprompted
        (SessionState::Idle, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from Idle with event {event:?}"
        ))),
    }
}
