pub mod feedback;
pub mod interviews;
pub mod sessions;

pub use feedback::{AnswerInput, FeedbackListResponse, FeedbackResponse, SubmitAnswersRequest};
pub use interviews::{GenerateInterviewRequest, InterviewListResponse, InterviewResponse};
pub use sessions::{
    CreateSessionRequest, JoinSessionRequest, MessageListResponse, MessageResponse,
    MessagesQuery, ParticipantResponse, SendMessageRequest, SessionAction,
    SessionActionResponse, SessionDetailResponse, SessionListResponse, SessionRef,
    SessionResponse,
};

use serde::Deserialize;
use validator::ValidationError;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// `?limit&offset` for list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<u64>,
}

impl ListQuery {
    pub fn limit(&self) -> i64 {
        clamp_limit(self.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }
}

/// Missing limits take the default; others are clamped into `1..=max`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn entries_not_blank(values: &[String]) -> Result<(), ValidationError> {
    if values.iter().any(|v| v.trim().is_empty()) {
        let mut err = ValidationError::new("blank_entry");
        err.message = Some("entries must not be blank".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_defaulted_and_clamped() {
        assert_eq!(clamp_limit(None, 20, 100), 20);
        assert_eq!(clamp_limit(Some(0), 20, 100), 1);
        assert_eq!(clamp_limit(Some(-5), 20, 100), 1);
        assert_eq!(clamp_limit(Some(1000), 20, 100), 100);
        assert_eq!(clamp_limit(Some(42), 20, 100), 42);
    }

    #[test]
    fn blank_strings_are_rejected() {
        assert!(not_blank("  \n").is_err());
        assert!(not_blank(" ok ").is_ok());
        assert!(entries_not_blank(&["rust".to_string(), " ".to_string()]).is_err());
    }
}
