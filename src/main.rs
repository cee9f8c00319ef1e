//! Aurora Assistant - conversation session server
//!
//! Serves chat sessions over HTTP and SSE, answering each user turn with
//! either the built-in simulator or an HTTP assistant backend.

use aurora_assistant::api::{create_router, AppState};
use aurora_assistant::responder::{HttpResponder, LoggingResponder, Responder, SimulatedResponder};
use aurora_assistant::AssistantConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const REAP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aurora_assistant=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = AssistantConfig::from_env();

    // Assistant backend
    let backend: Arc<dyn Responder> = match &config.backend_url {
        Some(url) => {
            tracing::info!(url = %url, timeout = ?config.backend_timeout, "Using HTTP assistant backend");
            Arc::new(HttpResponder::new(url.clone(), config.backend_timeout)?)
        }
        None => {
            tracing::info!(
                delay_ms = %config.response_delay.as_millis(),
                "No AURORA_BACKEND_URL set, using simulated replies"
            );
            Arc::new(SimulatedResponder::new(config.response_delay))
        }
    };
    let responder: Arc<dyn Responder> = Arc::new(LoggingResponder::new(backend));

    // Create application state
    let state = AppState::new(responder, config.greeting.clone());

    // End abandoned sessions
    let sessions = state.sessions.clone();
    let idle_timeout = config.session_idle_timeout;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(REAP_INTERVAL.min(idle_timeout).max(Duration::from_secs(1)));
        loop {
            ticker.tick().await;
            let reaped = sessions.reap_idle(idle_timeout).await;
            if reaped > 0 {
                tracing::info!(reaped, "Reaped idle sessions");
            }
        }
    });

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Aurora assistant listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
