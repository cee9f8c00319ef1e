//! Events that can occur in a session

use crate::responder::ResponderErrorKind;
use crate::session::{AssistantReply, UserTurn};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserSubmit {
        turn: UserTurn,
    },

    // Responder events
    ResponseReady {
        reply: AssistantReply,
    },
    ResponseFailed {
        message: String,
        kind: ResponderErrorKind,
    },
}
