//! HTTP API for the assistant
//!
//! A thin transport over the session commands and read model.

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::responder::Responder;
use crate::runtime::SessionManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(responder: Arc<dyn Responder>, greeting: impl Into<String>) -> Self {
        Self {
            sessions: Arc::new(SessionManager::new(responder, greeting)),
        }
    }
}
