use crate::dtos::{
    ListQuery, MessageListResponse, MessageResponse, MessagesQuery, SessionAction,
    SessionActionResponse, SessionDetailResponse, SessionListResponse, SessionResponse,
};
use crate::middleware::UserId;
use crate::utils::{Path, Query, ValidatedJson};
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use service_core::error::AppError;

/// Single entry point for the session lifecycle, dispatched on `action`.
#[tracing::instrument(skip(state, action), fields(action = action.name()))]
pub async fn session_action(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    ValidatedJson(action): ValidatedJson<SessionAction>,
) -> Result<(StatusCode, Json<SessionActionResponse>), AppError> {
    let status = match action {
        SessionAction::Create(_) | SessionAction::SendMessage(_) => StatusCode::CREATED,
        _ => StatusCode::OK,
    };
    let response = state.sessions.execute(&user_id, action).await?;
    Ok((status, Json(response)))
}

#[tracing::instrument(skip(state))]
pub async fn list_sessions(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Query(query): Query<ListQuery>,
) -> Result<Json<SessionListResponse>, AppError> {
    let limit = query.limit();
    let offset = query.offset();
    let sessions: Vec<SessionResponse> = state
        .sessions
        .list(&user_id, limit, offset)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(SessionListResponse {
        count: sessions.len(),
        sessions,
        limit,
        offset,
    }))
}

#[tracing::instrument(skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(session_id): Path<String>,
) -> Result<Json<SessionDetailResponse>, AppError> {
    let detail = state.sessions.get(&user_id, &session_id).await?;
    Ok(Json(SessionDetailResponse {
        session: detail.session.into(),
        participants: detail.participants.into_iter().map(Into::into).collect(),
    }))
}

#[tracing::instrument(skip(state))]
pub async fn list_messages(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(session_id): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<MessageListResponse>, AppError> {
    let messages: Vec<MessageResponse> = state
        .sessions
        .messages(&user_id, &session_id, query.since, query.limit())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(MessageListResponse {
        count: messages.len(),
        messages,
    }))
}
