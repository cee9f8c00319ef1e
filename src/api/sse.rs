//! Server-Sent Events support

use crate::runtime::SessionEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert broadcast stream to SSE stream
pub fn sse_stream(
    init_event: SessionEvent,
    broadcast_rx: tokio::sync::broadcast::Receiver<SessionEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Create stream that starts with init event then broadcasts
    let init = futures::stream::once(async move { Ok(session_event_to_axum(&init_event)) });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(event) => Some(Ok(session_event_to_axum(&event))),
        Err(_) => None, // Skip lagged messages
    });

    let combined = init.chain(broadcasts);

    Sse::new(combined).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn session_event_to_axum(event: &SessionEvent) -> Event {
    let data = serde_json::to_string(event).unwrap_or_else(|e| {
        tracing::error!(event = event.name(), error = %e, "Failed to serialize session event");
        String::from("{}")
    });
    Event::default().event(event.name()).data(data)
}
