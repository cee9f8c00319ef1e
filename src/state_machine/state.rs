//! Session state types

use serde::{Deserialize, Serialize};

/// Session state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionState {
    /// Ready for user input, no request outstanding
    #[default]
    Idle,

    /// A user turn was recorded and the assistant has not answered yet
    AwaitingResponse,
}

impl SessionState {
    /// Whether a request is outstanding
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionState::AwaitingResponse)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::AwaitingResponse => "awaiting_response",
        }
    }
}
