//! Assistant backend abstraction
//!
//! The session controller only knows [`Responder`]: one user turn in, exactly
//! one reply out, with arbitrary latency.

mod error;
pub mod http;
pub mod simulated;

pub use error::{ResponderError, ResponderErrorKind};
pub use http::HttpResponder;
pub use simulated::{compose_reply, SimulatedResponder, DEFAULT_RESPONSE_DELAY};

use crate::session::{AssistantReply, UserTurn};
use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for assistant backends
#[async_trait]
pub trait Responder: Send + Sync {
    /// Produce the reply to a single user turn
    async fn respond(&self, turn: &UserTurn) -> Result<AssistantReply, ResponderError>;

    /// Short backend name for logs
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: Responder + ?Sized> Responder for Arc<T> {
    async fn respond(&self, turn: &UserTurn) -> Result<AssistantReply, ResponderError> {
        (**self).respond(turn).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Logging wrapper for responders
pub struct LoggingResponder {
    inner: Arc<dyn Responder>,
    name: String,
}

impl LoggingResponder {
    pub fn new(inner: Arc<dyn Responder>) -> Self {
        let name = inner.name().to_string();
        Self { inner, name }
    }
}

#[async_trait]
impl Responder for LoggingResponder {
    async fn respond(&self, turn: &UserTurn) -> Result<AssistantReply, ResponderError> {
        let start = std::time::Instant::now();
        let result = self.inner.respond(turn).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    responder = %self.name,
                    duration_ms = %duration.as_millis(),
                    has_attachment = turn.attachment.is_some(),
                    reply_len = reply.text.len(),
                    "Assistant reply received"
                );
            }
            Err(e) => {
                tracing::error!(
                    responder = %self.name,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    retryable = e.kind.is_retryable(),
                    "Assistant reply failed"
                );
            }
        }

        result
    }

    fn name(&self) -> &str {
        &self.name
    }
}
