//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    AttachRequest, AttachResponse, ErrorResponse, QuickPromptRequest, QuickPromptResponse,
    QuickPromptsResponse, RemoveAttachmentResponse, SetInputRequest, SubmitRequest,
    SubmitResponse, SuccessResponse,
};
use super::AppState;
use crate::runtime::{
    InputOutcome, SessionError, SessionEvent, SessionSnapshot, StageOutcome, SubmitOutcome,
};
use crate::session::{AttachmentCandidate, FILE_PICKER_ACCEPT, QUICK_PROMPTS};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Session lifecycle
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/end", post(end_session))
        // SSE streaming
        .route("/api/sessions/:id/stream", get(stream_session))
        // Composer
        .route("/api/sessions/:id/input", post(set_input))
        .route("/api/sessions/:id/quick-prompt", post(use_quick_prompt))
        .route("/api/sessions/:id/attachment", post(stage_attachment))
        .route("/api/sessions/:id/attachment/remove", post(remove_attachment))
        .route("/api/sessions/:id/submit", post(submit))
        // Static info
        .route("/api/quick-prompts", get(list_quick_prompts))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Session Lifecycle
// ============================================================

async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionSnapshot>) {
    let handle = state.sessions.create().await;
    (StatusCode::CREATED, Json(handle.snapshot()))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let handle = state.sessions.get(&id).await?;
    Ok(Json(handle.snapshot()))
}

async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.sessions.end(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let handle = state.sessions.get(&id).await?;

    // Subscribe before reading the snapshot so nothing falls in between
    let broadcast_rx = handle.subscribe();
    let init_event = SessionEvent::Snapshot {
        snapshot: handle.snapshot(),
    };

    Ok(sse_stream(init_event, broadcast_rx))
}

// ============================================================
// Composer
// ============================================================

async fn set_input(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetInputRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let handle = state.sessions.get(&id).await?;
    match handle.set_input(req.text).await? {
        InputOutcome::Busy => Err(busy_input()),
        InputOutcome::Applied | InputOutcome::UnknownPrompt => Ok(Json(handle.snapshot())),
    }
}

async fn use_quick_prompt(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<QuickPromptRequest>,
) -> Result<Json<QuickPromptResponse>, AppError> {
    let handle = state.sessions.get(&id).await?;
    match handle.use_quick_prompt(req.index).await? {
        InputOutcome::Busy => Err(busy_input()),
        outcome => Ok(Json(QuickPromptResponse {
            applied: outcome.is_applied(),
        })),
    }
}

fn busy_input() -> AppError {
    AppError::Conflict("Cannot edit the message while a reply is pending".to_string())
}

async fn stage_attachment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AttachRequest>,
) -> Result<Json<AttachResponse>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Attachment name is required".to_string()));
    }
    let handle = state.sessions.get(&id).await?;

    let media_type = req
        .media_type
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            mime_guess::from_path(&req.name)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        });
    let candidate = AttachmentCandidate::new(req.name, media_type);

    match handle.stage_attachment(candidate).await? {
        StageOutcome::Staged {
            attachment,
            replaced,
        } => Ok(Json(AttachResponse {
            staged: attachment,
            replaced,
        })),
        StageOutcome::Rejected(rejection) => {
            Err(AppError::UnsupportedMediaType(rejection.to_string()))
        }
        StageOutcome::Busy => Err(AppError::Conflict(
            "Cannot attach while a reply is pending".to_string(),
        )),
    }
}

async fn remove_attachment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RemoveAttachmentResponse>, AppError> {
    let handle = state.sessions.get(&id).await?;
    let removed = handle.remove_attachment().await?;
    Ok(Json(RemoveAttachmentResponse { removed }))
}

async fn submit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    let handle = state.sessions.get(&id).await?;
    let response = match handle.submit(req.text).await? {
        SubmitOutcome::Accepted { message_id } => SubmitResponse {
            accepted: true,
            message_id: Some(message_id),
        },
        SubmitOutcome::Ignored => SubmitResponse {
            accepted: false,
            message_id: None,
        },
    };
    Ok(Json(response))
}

// ============================================================
// Static Info
// ============================================================

async fn list_quick_prompts() -> Json<QuickPromptsResponse> {
    Json(QuickPromptsResponse {
        prompts: QUICK_PROMPTS.to_vec(),
        accept: FILE_PICKER_ACCEPT,
    })
}

async fn get_version() -> &'static str {
    concat!("aurora-assistant ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    UnsupportedMediaType(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        // An ended session is indistinguishable from an unknown one to clients
        match e {
            SessionError::NotFound(_) | SessionError::Closed(_) => AppError::NotFound(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::UnsupportedMediaType(msg) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
