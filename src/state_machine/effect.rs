//! Effects produced by state transitions

use crate::session::{AssistantReply, NewMessage, UserTurn};

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append an entry to the message log (the view is notified afterwards)
    AppendMessage { entry: NewMessage },

    /// Reset the draft input and the staged attachment
    ClearComposer,

    /// Ask the responder for a reply (runs as a background task)
    RequestResponse { turn: UserTurn },

    /// Publish a fresh snapshot of the read model
    PublishSnapshot,

    /// Tell subscribers a backend call failed
    NotifyFailure { message: String, retryable: bool },
}

impl Effect {
    pub fn append_user_turn(turn: &UserTurn) -> Self {
        Effect::AppendMessage {
            entry: NewMessage::user(turn.display_content(), turn.attachment.clone()),
        }
    }

    pub fn append_reply(reply: AssistantReply) -> Self {
        Effect::AppendMessage {
            entry: NewMessage::assistant(reply.text),
        }
    }

    pub fn append_failure(message: &str) -> Self {
        Effect::AppendMessage {
            entry: NewMessage::assistant_error(format!(
                "Sorry, I couldn't respond to that: {message}"
            )),
        }
    }

    pub fn request_response(turn: UserTurn) -> Self {
        Effect::RequestResponse { turn }
    }
}
