//! Demo responder that echoes the turn back after a fixed delay

use super::{Responder, ResponderError};
use crate::session::{AssistantReply, UserTurn};
use async_trait::async_trait;
use std::time::Duration;

/// Latency of the demo backend
pub const DEFAULT_RESPONSE_DELAY: Duration = Duration::from_millis(1000);

/// Stand-in for a real assistant; never fails
#[derive(Debug, Clone)]
pub struct SimulatedResponder {
    delay: Duration,
}

impl SimulatedResponder {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedResponder {
    fn default() -> Self {
        Self::new(DEFAULT_RESPONSE_DELAY)
    }
}

#[async_trait]
impl Responder for SimulatedResponder {
    async fn respond(&self, turn: &UserTurn) -> Result<AssistantReply, ResponderError> {
        tokio::time::sleep(self.delay).await;
        Ok(AssistantReply::new(compose_reply(turn)))
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

/// Reply text for a turn
pub fn compose_reply(turn: &UserTurn) -> String {
    match &turn.attachment {
        Some(attachment) => {
            let also_asked = if turn.has_text() {
                format!("You also asked: \"{}\". ", turn.text)
            } else {
                String::new()
            };
            format!(
                "I received your {} file \"{}\". {also_asked}In a production app, I would analyze this file using AI.",
                attachment.kind(),
                attachment.name,
            )
        }
        None => format!(
            "I received your message: \"{}\". This is a demo response. In a production app, this would be powered by a real AI model.",
            turn.text
        ),
    }
}
