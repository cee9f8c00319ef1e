//! Conversation entries and the append-only message log

use super::Attachment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content recorded for a user turn that only carries an attachment
pub const UPLOAD_PLACEHOLDER: &str = "Uploaded a file";

/// Session-unique message identifier, assigned in append order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A fully formed entry in the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    /// Set on assistant entries reporting a failed backend call
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
    pub created_at: DateTime<Utc>,
}

/// An entry waiting for its identifier
///
/// Only user entries can carry an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    role: Role,
    content: String,
    attachment: Option<Attachment>,
    is_error: bool,
}

impl NewMessage {
    pub fn user(content: impl Into<String>, attachment: Option<Attachment>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            attachment,
            is_error: false,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            attachment: None,
            is_error: false,
        }
    }

    pub fn assistant_error(content: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::assistant(content)
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }
}

/// Ordered, append-only conversation log
#[derive(Debug, Clone)]
pub struct MessageLog {
    entries: Vec<Message>,
    next_id: u64,
}

impl MessageLog {
    /// A log holding only the assistant greeting
    pub fn seeded(greeting: impl Into<String>) -> Self {
        let mut log = Self {
            entries: Vec::new(),
            next_id: 1,
        };
        log.append(NewMessage::assistant(greeting));
        log
    }

    /// Assign the next identifier and record the entry
    pub fn append(&mut self, entry: NewMessage) -> &Message {
        let id = MessageId(self.next_id);
        self.next_id += 1;

        self.entries.push(Message {
            id,
            role: entry.role,
            content: entry.content,
            attachment: entry.attachment,
            is_error: entry.is_error,
            created_at: Utc::now(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn snapshot(&self) -> &[Message] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&Message> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
