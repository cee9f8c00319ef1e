//! Session data model and the leaf components the controller is built from
//!
//! Everything here is synchronous and owned by a single session task.

pub mod attachment;
pub mod composer;
pub mod gate;
pub mod message;

pub use attachment::{
    validate, Attachment, AttachmentCandidate, AttachmentKind, UnsupportedMediaType, Validation,
    FILE_PICKER_ACCEPT,
};
pub use composer::Composer;
pub use gate::can_submit;
pub use message::{Message, MessageId, MessageLog, NewMessage, Role, UPLOAD_PLACEHOLDER};

use serde::{Deserialize, Serialize};

/// Default seeded assistant greeting
pub const DEFAULT_GREETING: &str = "Hello! I'm your AI assistant. How can I help you today?";

/// Prompts offered next to the input box
pub const QUICK_PROMPTS: [&str; 4] = [
    "Summarize the attached PDF in 3 bullet points.",
    "Draft meeting notes from this voice memo.",
    "Give me 3 key risks and mitigations.",
    "Rewrite this in a warmer tone.",
];

/// One user submission as handed to the assistant backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTurn {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
}

impl UserTurn {
    pub fn new(text: impl Into<String>, attachment: Option<Attachment>) -> Self {
        Self {
            text: text.into(),
            attachment,
        }
    }

    /// Any text at all, whitespace included, is sent and shown as typed
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }

    /// Nothing the gate would let through
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.attachment.is_none()
    }

    /// Content shown for this turn in the log
    pub fn display_content(&self) -> &str {
        if self.has_text() {
            &self.text
        } else {
            UPLOAD_PLACEHOLDER
        }
    }
}

/// Reply produced by the assistant backend for a single turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub text: String,
}

impl AssistantReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
