//! Axum route handlers for the Screening API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::screening::conversation::{ConversationSession, ReplyKind};
use crate::screening::models::{CandidateProfile, ChatEntry, ConversationState, Progress};
use crate::screening::store::SessionHandle;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SessionStartResponse {
    pub session_id: Uuid,
    pub reply: String,
    pub state: ConversationState,
    pub progress: Progress,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub reply: String,
    pub kind: ReplyKind,
    pub state: ConversationState,
    pub progress: Progress,
}

#[derive(Debug, Serialize)]
pub struct SessionDetailResponse {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub started: bool,
    pub state: ConversationState,
    pub progress: Progress,
    pub profile: CandidateProfile,
    pub summary: String,
    pub technical_questions: Vec<String>,
    pub current_question_index: usize,
    pub chat_log: Vec<ChatEntry>,
}

impl From<&ConversationSession> for SessionDetailResponse {
    fn from(session: &ConversationSession) -> Self {
        SessionDetailResponse {
            session_id: session.id,
            created_at: session.created_at,
            last_active_at: session.last_active_at(),
            started: session.is_started(),
            state: session.state(),
            progress: session.progress(),
            profile: session.profile().clone(),
            summary: session.profile().summary(),
            technical_questions: session.technical_questions().to_vec(),
            current_question_index: session.current_question_index(),
            chat_log: session.chat_log().to_vec(),
        }
    }
}

impl SessionStartResponse {
    fn greeting(session_id: Uuid, reply: String) -> Self {
        let state = ConversationState::Greeting;
        SessionStartResponse {
            session_id,
            reply,
            state,
            progress: Progress::from(state),
        }
    }
}

async fn find_session(state: &AppState, id: Uuid) -> Result<SessionHandle, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
///
/// Opens a new screening conversation and returns the greeting.
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionStartResponse>) {
    let (session_id, greeting) = state.sessions.create().await;
    (
        StatusCode::CREATED,
        Json(SessionStartResponse::greeting(session_id, greeting)),
    )
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionDetailResponse>, AppError> {
    let handle = find_session(&state, id).await?;
    let session = handle.lock().await;

    Ok(Json(SessionDetailResponse::from(&*session)))
}

/// POST /api/v1/sessions/:id/messages
///
/// Feeds one candidate message into the conversation. Invalid answers are not errors
/// here: they come back as a `reprompt` reply with status 200.
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    let handle = find_session(&state, id).await?;
    let mut session = handle.lock().await;
    let reply = session
        .submit(&request.text, state.question_source.as_ref())
        .await;

    Ok(Json(SubmitResponse {
        reply: reply.text,
        kind: reply.kind,
        state: session.state(),
        progress: session.progress(),
    }))
}

/// POST /api/v1/sessions/:id/reset
///
/// Throws away everything collected so far and greets the candidate again.
pub async fn handle_reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionStartResponse>, AppError> {
    let greeting = state
        .sessions
        .reset(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;

    Ok(Json(SessionStartResponse::greeting(id, greeting)))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}
