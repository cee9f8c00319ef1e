//! HTTP assistant backend
//!
//! POSTs the user turn as JSON and expects `{"text": ...}` back.

use super::{Responder, ResponderError};
use crate::session::{AssistantReply, UserTurn};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub struct HttpResponder {
    client: Client,
    url: String,
}

impl HttpResponder {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ResponderError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ResponderError::unknown(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    fn classify_status(status: reqwest::StatusCode, body: &str) -> ResponderError {
        match status.as_u16() {
            500..=599 => ResponderError::server_error(format!("Server error: {body}")),
            400..=499 => ResponderError::invalid_request(format!("Request rejected ({status}): {body}")),
            _ => ResponderError::unknown(format!("HTTP {status}: {body}")),
        }
    }
}

#[async_trait]
impl Responder for HttpResponder {
    async fn respond(&self, turn: &UserTurn) -> Result<AssistantReply, ResponderError> {
        let response = self
            .client
            .post(&self.url)
            .json(turn)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ResponderError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    ResponderError::network(format!("Connection failed: {e}"))
                } else {
                    ResponderError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ResponderError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::classify_status(status, &body));
        }

        serde_json::from_str::<AssistantReply>(&body).map_err(|e| {
            ResponderError::invalid_response(format!("Failed to parse reply: {e} - body: {body}"))
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}
