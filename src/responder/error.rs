//! Responder error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Backend failure with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ResponderError {
    pub kind: ResponderErrorKind,
    pub message: String,
}

impl ResponderError {
    pub fn new(kind: ResponderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ResponderErrorKind::Network, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(ResponderErrorKind::ServerError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ResponderErrorKind::InvalidRequest, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ResponderErrorKind::InvalidResponse, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ResponderErrorKind::Unknown, message)
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponderErrorKind {
    /// Connection failures, timeouts
    Network,
    /// Backend returned 5xx
    ServerError,
    /// Backend refused the request (4xx)
    InvalidRequest,
    /// Backend answered with something that is not a reply
    InvalidResponse,
    Unknown,
}

impl ResponderErrorKind {
    /// The user may reasonably try the same turn again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network | Self::ServerError)
    }
}
