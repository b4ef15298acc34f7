use crate::dtos::{GenerateInterviewRequest, InterviewListResponse, InterviewResponse, ListQuery};
use crate::middleware::UserId;
use crate::utils::{Path, Query, ValidatedJson};
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use service_core::error::AppError;

#[tracing::instrument(skip(state, request))]
pub async fn generate_interview(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    ValidatedJson(request): ValidatedJson<GenerateInterviewRequest>,
) -> Result<(StatusCode, Json<InterviewResponse>), AppError> {
    let interview = state.interviews.generate(&user_id, request).await?;
    Ok((StatusCode::CREATED, Json(interview.into())))
}

#[tracing::instrument(skip(state))]
pub async fn list_interviews(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Query(query): Query<ListQuery>,
) -> Result<Json<InterviewListResponse>, AppError> {
    let limit = query.limit();
    let offset = query.offset();
    let interviews: Vec<InterviewResponse> = state
        .interviews
        .list(&user_id, limit, offset)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(InterviewListResponse {
        count: interviews.len(),
        interviews,
        limit,
        offset,
    }))
}

#[tracing::instrument(skip(state))]
pub async fn get_interview(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(interview_id): Path<String>,
) -> Result<Json<InterviewResponse>, AppError> {
    let interview = state.interviews.get(&user_id, &interview_id).await?;
    Ok(Json(interview.into()))
}

#[tracing::instrument(skip(state))]
pub async fn delete_interview(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(interview_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.interviews.delete(&user_id, &interview_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
