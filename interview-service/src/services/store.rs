//! Persistence contract for interview documents.
//!
//! Two backends implement it: [`MongoStore`](super::MongoStore) for
//! deployments and [`MemoryStore`](super::MemoryStore) for local runs and
//! tests. Both enforce participant uniqueness and role exclusivity
//! atomically and report violations as `AppError::Conflict`.

use crate::models::{
    Feedback, Interview, InterviewSession, Message, Participant, ParticipantRole,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use service_core::error::AppError;

/// Partial update applied to a session that has not ended.
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    /// Replace the roles held by joined participants.
    pub participant_roles: Option<Vec<ParticipantRole>>,
    /// Move a `created` or `scheduled` session to `in_progress`.
    pub start: bool,
}

impl SessionUpdate {
    pub fn start() -> Self {
        Self {
            participant_roles: None,
            start: true,
        }
    }
}

#[async_trait]
pub trait InterviewStore: Send + Sync {
    /// Short backend name for health reporting.
    fn backend(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), AppError>;

    // Interviews

    async fn insert_interview(&self, interview: &Interview) -> Result<(), AppError>;

    async fn find_interview(
        &self,
        interview_id: &str,
        user_id: &str,
    ) -> Result<Option<Interview>, AppError>;

    /// Newest first.
    async fn list_interviews(
        &self,
        user_id: &str,
        limit: i64,
        offset: u64,
    ) -> Result<Vec<Interview>, AppError>;

    async fn delete_interview(&self, interview_id: &str, user_id: &str) -> Result<bool, AppError>;

    // Feedback

    async fn insert_feedback(&self, feedback: &Feedback) -> Result<(), AppError>;

    /// Newest first.
    async fn list_feedback(
        &self,
        interview_id: &str,
        user_id: &str,
    ) -> Result<Vec<Feedback>, AppError>;

    async fn delete_feedback_for_interview(&self, interview_id: &str) -> Result<u64, AppError>;

    // Sessions

    async fn insert_session(&self, session: &InterviewSession) -> Result<(), AppError>;

    async fn find_session(&self, session_id: &str) -> Result<Option<InterviewSession>, AppError>;

    async fn replace_session(&self, session: &InterviewSession) -> Result<(), AppError>;

    /// Apply `update` atomically unless the session has ended, returning the
    /// stored session afterwards. An ended session is a conflict.
    async fn update_live_session(
        &self,
        session_id: &str,
        update: &SessionUpdate,
    ) -> Result<InterviewSession, AppError>;

    /// Sessions created by the user or in which the user has a participant
    /// record, newest first.
    async fn list_sessions_for_user(
        &self,
        user_id: &str,
        limit: i64,
        offset: u64,
    ) -> Result<Vec<InterviewSession>, AppError>;

    // Participants

    async fn insert_participant(&self, participant: &Participant) -> Result<(), AppError>;

    async fn find_participant(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> Result<Option<Participant>, AppError>;

    /// Ordered by join time.
    async fn list_participants(&self, session_id: &str) -> Result<Vec<Participant>, AppError>;

    async fn replace_participant(&self, participant: &Participant) -> Result<(), AppError>;

    // Messages

    async fn insert_message(&self, message: &Message) -> Result<(), AppError>;

    /// Chronological; `since` is exclusive.
    async fn list_messages(
        &self,
        session_id: &str,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<Message>, AppError>;

    /// The last `count` messages, in chronological order.
    async fn recent_messages(&self, session_id: &str, count: i64)
        -> Result<Vec<Message>, AppError>;
}

/// Conflict raised when an exclusive role is already held.
pub fn role_taken(role: impl std::fmt::Display) -> AppError {
    AppError::Conflict(anyhow::anyhow!(
        "The {} role is already taken in this session",
        role
    ))
}

/// Conflict raised when a session has already ended.
pub fn session_ended() -> AppError {
    AppError::Conflict(anyhow::anyhow!("Session has ended"))
}

/// Conflict raised when a user already has a participant record.
pub fn already_participant() -> AppError {
    AppError::Conflict(anyhow::anyhow!(
        "User already has a participant record in this session"
    ))
}
