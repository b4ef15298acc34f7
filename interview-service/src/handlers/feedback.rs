use crate::dtos::{FeedbackListResponse, FeedbackResponse, SubmitAnswersRequest};
use crate::middleware::UserId;
use crate::utils::{Path, ValidatedJson};
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use service_core::error::AppError;

#[tracing::instrument(skip(state, request))]
pub async fn submit_answers(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(interview_id): Path<String>,
    ValidatedJson(request): ValidatedJson<SubmitAnswersRequest>,
) -> Result<(StatusCode, Json<FeedbackResponse>), AppError> {
    let (feedback, saved) = state
        .interviews
        .submit_answers(&user_id, &interview_id, request.answers)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(FeedbackResponse::new(feedback, saved)),
    ))
}

#[tracing::instrument(skip(state))]
pub async fn list_feedback(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(interview_id): Path<String>,
) -> Result<Json<FeedbackListResponse>, AppError> {
    let feedback: Vec<FeedbackResponse> = state
        .interviews
        .list_feedback(&user_id, &interview_id)
        .await?
        .into_iter()
        .map(|f| FeedbackResponse::new(f, true))
        .collect();

    Ok(Json(FeedbackListResponse {
        count: feedback.len(),
        feedback,
    }))
}
