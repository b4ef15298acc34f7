use super::not_blank;
use crate::models::{AnswerRecord, Feedback, QuestionFeedback};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnswerInput {
    #[validate(length(min = 1, message = "Question id is required"))]
    pub question_id: String,

    #[validate(
        length(min = 1, max = 10000, message = "Answer must be 1-10000 characters"),
        custom(function = "not_blank")
    )]
    pub answer: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswersRequest {
    #[validate(
        length(min = 1, max = 50, message = "Submit between 1 and 50 answers"),
        nested
    )]
    pub answers: Vec<AnswerInput>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub feedback_id: String,
    pub interview_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<i32>,
    pub summary: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub question_feedback: Vec<QuestionFeedback>,
    pub answers: Vec<AnswerRecord>,
    pub model: String,
    pub created_at: DateTime<Utc>,
    /// Whether the feedback was persisted.
    pub saved: bool,
}

impl FeedbackResponse {
    pub fn new(feedback: Feedback, saved: bool) -> Self {
        Self {
            feedback_id: feedback.feedback_id,
            interview_id: feedback.interview_id,
            overall_score: feedback.overall_score,
            summary: feedback.summary,
            strengths: feedback.strengths,
            improvements: feedback.improvements,
            question_feedback: feedback.question_feedback,
            answers: feedback.answers,
            model: feedback.model,
            created_at: feedback.created_at,
            saved,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeedbackListResponse {
    pub feedback: Vec<FeedbackResponse>,
    pub count: usize,
}
