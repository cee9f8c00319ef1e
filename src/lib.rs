//! Aurora Assistant - conversation session controller
//!
//! A user exchanges text and a single audio or PDF attachment per turn with an
//! assistant. Each session is an explicit state machine driven by one runtime
//! task; the assistant backend sits behind the [`responder::Responder`] trait.

#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions
)]

pub mod api;
pub mod config;
pub mod responder;
pub mod runtime;
pub mod session;
pub mod state_machine;

pub use config::AssistantConfig;
pub use runtime::{SessionHandle, SessionManager};
pub use session::{Attachment, Message, MessageId, Role, UserTurn};
