//! Trait abstractions for runtime side effects
//!
//! These traits enable testing the executor with mock implementations.

use super::SessionEvent;
use crate::session::Message;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Observer told about every change to the message log
pub trait ViewNotifier: Send + Sync {
    /// Called after each append with the full log
    fn on_change(&self, messages: &[Message]);
}

impl<T: ViewNotifier + ?Sized> ViewNotifier for Arc<T> {
    fn on_change(&self, messages: &[Message]) {
        (**self).on_change(messages);
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Asks connected clients to scroll to the newest entry
#[derive(Clone)]
pub struct BroadcastNotifier {
    broadcast_tx: broadcast::Sender<SessionEvent>,
}

impl BroadcastNotifier {
    pub fn new(broadcast_tx: broadcast::Sender<SessionEvent>) -> Self {
        Self { broadcast_tx }
    }
}

impl ViewNotifier for BroadcastNotifier {
    fn on_change(&self, messages: &[Message]) {
        if let Some(latest) = messages.last() {
            // No subscribers is fine
            let _ = self.broadcast_tx.send(SessionEvent::ScrollToLatest {
                message_id: latest.id,
            });
        }
    }
}
