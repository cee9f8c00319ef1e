//! Submission gate

use super::Attachment;

/// At most one outstanding request, and never an empty submission
pub fn can_submit(text: &str, staged: Option<&Attachment>, busy: bool) -> bool {
    !busy && (!text.trim().is_empty() || staged.is_some())
}
