use super::opt_chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Interviewer,
    Candidate,
    Observer,
}

impl ParticipantRole {
    /// At most one joined participant may hold an exclusive role.
    pub fn is_exclusive(&self) -> bool {
        matches!(self, ParticipantRole::Interviewer | ParticipantRole::Candidate)
    }
}

impl std::fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParticipantRole::Interviewer => write!(f, "interviewer"),
            ParticipantRole::Candidate => write!(f, "candidate"),
            ParticipantRole::Observer => write!(f, "observer"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    Joined,
    Left,
}

impl std::fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParticipantStatus::Joined => write!(f, "joined"),
            ParticipantStatus::Left => write!(f, "left"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub participant_id: String,
    pub session_id: String,
    pub user_id: String,
    pub role: ParticipantRole,
    pub status: ParticipantStatus,
    /// Mirrors `role.is_exclusive()`; backs the partial unique index.
    pub exclusive: bool,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub joined_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "opt_chrono_datetime_as_bson_datetime"
    )]
    pub left_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reconnect_count: i32,
}

impl Participant {
    pub fn new(session_id: String, user_id: String, role: ParticipantRole) -> Self {
        Self {
            id: None,
            participant_id: uuid::Uuid::new_v4().to_string(),
            session_id,
            user_id,
            role,
            status: ParticipantStatus::Joined,
            exclusive: role.is_exclusive(),
            joined_at: Utc::now(),
            left_at: None,
            reconnect_count: 0,
        }
    }

    pub fn is_joined(&self) -> bool {
        self.status == ParticipantStatus::Joined
    }

    /// Whether this participant currently occupies `role` exclusively.
    pub fn holds_exclusive(&self, role: ParticipantRole) -> bool {
        self.is_joined() && self.exclusive && self.role == role
    }

    pub fn leave(&mut self) {
        self.status = ParticipantStatus::Left;
        self.left_at = Some(Utc::now());
    }

    /// Reconnect a participant who previously left, possibly with a new role.
    pub fn rejoin(&mut self, role: ParticipantRole) {
        self.role = role;
        self.exclusive = role.is_exclusive();
        self.status = ParticipantStatus::Joined;
        self.joined_at = Utc::now();
        self.left_at = None;
        self.reconnect_count += 1;
    }
}
