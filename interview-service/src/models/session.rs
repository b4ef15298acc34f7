use super::opt_chrono_datetime_as_bson_datetime;
use super::ParticipantRole;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a live interview session.
///
/// Older documents spell the running state `in-progress`; it is read as
/// `InProgress` and always written back as `in_progress`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Created,
    Scheduled,
    #[serde(alias = "in-progress")]
    InProgress,
    Ended,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Created => write!(f, "created"),
            SessionStatus::Scheduled => write!(f, "scheduled"),
            SessionStatus::InProgress => write!(f, "in_progress"),
            SessionStatus::Ended => write!(f, "ended"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSession {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub session_id: String,
    pub title: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub status: SessionStatus,
    pub created_by: String,
    /// Roles currently held by joined participants.
    #[serde(default)]
    pub participant_roles: Vec<ParticipantRole>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "opt_chrono_datetime_as_bson_datetime"
    )]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "opt_chrono_datetime_as_bson_datetime"
    )]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "opt_chrono_datetime_as_bson_datetime"
    )]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl InterviewSession {
    pub fn new(
        title: String,
        role: String,
        company: Option<String>,
        created_by: String,
        scheduled_at: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();
        let status = match scheduled_at {
            Some(at) if at > now => SessionStatus::Scheduled,
            _ => SessionStatus::Created,
        };

        Self {
            id: None,
            session_id: uuid::Uuid::new_v4().to_string(),
            title,
            role,
            company,
            status,
            created_by,
            participant_roles: Vec::new(),
            scheduled_at,
            started_at: None,
            ended_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.status == SessionStatus::Ended
    }

    /// Whether the session has not started yet.
    pub fn is_pending(&self) -> bool {
        matches!(self.status, SessionStatus::Created | SessionStatus::Scheduled)
    }

    /// Move a pending session to `in_progress`. Returns whether it changed.
    pub fn start(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }
        let now = Utc::now();
        self.status = SessionStatus::InProgress;
        self.started_at = Some(now);
        self.updated_at = now;
        true
    }

    pub fn end(&mut self) {
        let now = Utc::now();
        self.status = SessionStatus::Ended;
        self.ended_at = Some(now);
        self.participant_roles.clear();
        self.updated_at = now;
    }

    pub fn set_participant_roles(&mut self, roles: Vec<ParticipantRole>) {
        self.participant_roles = roles;
        self.updated_at = Utc::now();
    }
}
