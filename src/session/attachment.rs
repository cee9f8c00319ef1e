//! Attachment validation
//!
//! Only audio files and PDFs may be attached to a turn.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Accept filter for a file picker feeding [`validate`]
pub const FILE_PICKER_ACCEPT: &str = "audio/*,application/pdf,.pdf,.mp3,.wav,.m4a,.ogg,.webm";

const AUDIO_PREFIX: &str = "audio/";
const PDF_MEDIA_TYPE: &str = "application/pdf";

/// A file offered by the presentation layer, before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentCandidate {
    pub name: String,
    pub media_type: String,
}

impl AttachmentCandidate {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
        }
    }
}

/// A validated file, staged or recorded on a user turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub media_type: String,
}

impl Attachment {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
        }
    }

    pub fn kind(&self) -> AttachmentKind {
        AttachmentKind::from_media_type(&self.media_type)
    }
}

/// Coarse file category used in replies and icons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Pdf,
    Audio,
}

impl AttachmentKind {
    pub fn from_media_type(media_type: &str) -> Self {
        if media_type.contains("pdf") {
            AttachmentKind::Pdf
        } else {
            AttachmentKind::Audio
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentKind::Pdf => write!(f, "PDF"),
            AttachmentKind::Audio => write!(f, "audio"),
        }
    }
}

/// Why a candidate was turned away
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("unsupported attachment type `{media_type}` for `{name}` (expected audio/* or application/pdf)")]
pub struct UnsupportedMediaType {
    pub name: String,
    pub media_type: String,
}

/// Outcome of [`validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Accepted(Attachment),
    Rejected(UnsupportedMediaType),
}

impl Validation {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Validation::Accepted(_))
    }
}

/// Accept `audio/*` and exactly `application/pdf`
pub fn validate(candidate: &AttachmentCandidate) -> Validation {
    let media_type = candidate.media_type.as_str();
    if media_type.starts_with(AUDIO_PREFIX) || media_type == PDF_MEDIA_TYPE {
        Validation::Accepted(Attachment::new(&candidate.name, media_type))
    } else {
        Validation::Rejected(UnsupportedMediaType {
            name: candidate.name.clone(),
            media_type: candidate.media_type.clone(),
        })
    }
}
