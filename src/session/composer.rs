//! Draft input and the single staged-attachment slot

use super::{Attachment, UserTurn};

/// What the user is about to send
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    input: String,
    staged: Option<Attachment>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn staged(&self) -> Option<&Attachment> {
        self.staged.as_ref()
    }

    /// Stage a validated attachment, returning the one it replaced
    pub fn stage(&mut self, attachment: Attachment) -> Option<Attachment> {
        self.staged.replace(attachment)
    }

    /// Clear the staged slot; a no-op when nothing is staged
    pub fn remove_staged(&mut self) -> Option<Attachment> {
        self.staged.take()
    }

    /// The turn that submitting now would send
    pub fn turn(&self) -> UserTurn {
        UserTurn::new(self.input.clone(), self.staged.clone())
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.staged = None;
    }
}
