use super::ParticipantRole;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Sender id used for replies produced by the AI interviewer.
pub const AI_INTERVIEWER_ID: &str = "ai-interviewer";

/// Sender id used for lifecycle notices.
pub const SYSTEM_SENDER_ID: &str = "system";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Text,
    Question,
    Answer,
    Feedback,
    System,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageKind::Text => write!(f, "text"),
            MessageKind::Question => write!(f, "question"),
            MessageKind::Answer => write!(f, "answer"),
            MessageKind::Feedback => write!(f, "feedback"),
            MessageKind::System => write!(f, "system"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub message_id: String,
    pub session_id: String,
    pub sender_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_role: Option<ParticipantRole>,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        session_id: String,
        sender_id: String,
        sender_role: Option<ParticipantRole>,
        content: String,
        kind: MessageKind,
    ) -> Self {
        Self {
            id: None,
            message_id: uuid::Uuid::new_v4().to_string(),
            session_id,
            sender_id,
            sender_role,
            content,
            kind,
            created_at: Utc::now(),
        }
    }

    pub fn system(session_id: String, content: String) -> Self {
        Self::new(
            session_id,
            SYSTEM_SENDER_ID.to_string(),
            None,
            content,
            MessageKind::System,
        )
    }
}
