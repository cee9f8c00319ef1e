//! API request and response types

use crate::session::{Attachment, MessageId};
use serde::{Deserialize, Serialize};

/// Request to replace the draft input
#[derive(Debug, Deserialize)]
pub struct SetInputRequest {
    pub text: String,
}

/// Request to apply one of the quick prompts
#[derive(Debug, Deserialize)]
pub struct QuickPromptRequest {
    pub index: usize,
}

/// A file offered by the picker
#[derive(Debug, Deserialize)]
pub struct AttachRequest {
    pub name: String,
    /// Guessed from the file name when absent
    #[serde(default)]
    pub media_type: Option<String>,
}

/// Request to submit the composer
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubmitRequest {
    /// Replaces the draft input before submitting
    pub text: Option<String>,
}

/// Response for submit
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<MessageId>,
}

/// Response for a staged attachment
#[derive(Debug, Serialize)]
pub struct AttachResponse {
    pub staged: Attachment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced: Option<Attachment>,
}

/// Response for attachment removal
#[derive(Debug, Serialize)]
pub struct RemoveAttachmentResponse {
    pub removed: Option<Attachment>,
}

/// Response for a quick prompt
#[derive(Debug, Serialize)]
pub struct QuickPromptResponse {
    pub applied: bool,
}

/// Response listing quick prompts
#[derive(Debug, Serialize)]
pub struct QuickPromptsResponse {
    pub prompts: Vec<&'static str>,
    /// Accept filter for a file picker
    pub accept: &'static str,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
