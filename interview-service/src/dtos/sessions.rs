//! Request and response bodies for `/api/sessions`.
//!
//! Every lifecycle operation posts to the same endpoint and is selected by
//! the `action` field, e.g. `{"action": "join", "session_id": "...",
//! "role": "candidate"}`.

use super::{clamp_limit, not_blank};
use crate::models::{
    InterviewSession, Message, MessageKind, Participant, ParticipantRole, ParticipantStatus,
    SessionStatus,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

pub const DEFAULT_MESSAGE_PAGE_SIZE: i64 = 100;
pub const MAX_MESSAGE_PAGE_SIZE: i64 = 500;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(
        length(min = 1, max = 200, message = "Title must be 1-200 characters"),
        custom(function = "not_blank")
    )]
    pub title: String,

    #[validate(
        length(min = 1, max = 120, message = "Role must be 1-120 characters"),
        custom(function = "not_blank")
    )]
    pub role: String,

    #[validate(length(max = 120, message = "Company must be at most 120 characters"))]
    pub company: Option<String>,

    pub scheduled_at: Option<DateTime<Utc>>,

    /// Role the creator joins with; interviewer when omitted.
    pub as_role: Option<ParticipantRole>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct JoinSessionRequest {
    #[validate(length(min = 1, message = "Session id is required"))]
    pub session_id: String,

    pub role: ParticipantRole,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, message = "Session id is required"))]
    pub session_id: String,

    #[validate(
        length(min = 1, max = 10000, message = "Content must be 1-10000 characters"),
        custom(function = "not_blank")
    )]
    pub content: String,

    #[serde(rename = "type", default)]
    pub kind: MessageKind,

    #[serde(default)]
    pub request_ai_reply: bool,
}

/// Body of `leave` and `end`.
#[derive(Debug, Deserialize, Validate)]
pub struct SessionRef {
    #[validate(length(min = 1, message = "Session id is required"))]
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SessionAction {
    Create(CreateSessionRequest),
    Join(JoinSessionRequest),
    SendMessage(SendMessageRequest),
    Leave(SessionRef),
    End(SessionRef),
}

impl SessionAction {
    pub fn name(&self) -> &'static str {
        match self {
            SessionAction::Create(_) => "create",
            SessionAction::Join(_) => "join",
            SessionAction::SendMessage(_) => "send_message",
            SessionAction::Leave(_) => "leave",
            SessionAction::End(_) => "end",
        }
    }
}

impl Validate for SessionAction {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            SessionAction::Create(request) => request.validate(),
            SessionAction::Join(request) => request.validate(),
            SessionAction::SendMessage(request) => request.validate(),
            SessionAction::Leave(request) | SessionAction::End(request) => request.validate(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    /// Only messages strictly newer than this instant.
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

impl MessagesQuery {
    pub fn limit(&self) -> i64 {
        clamp_limit(self.limit, DEFAULT_MESSAGE_PAGE_SIZE, MAX_MESSAGE_PAGE_SIZE)
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub title: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub status: SessionStatus,
    pub created_by: String,
    pub participant_roles: Vec<ParticipantRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<InterviewSession> for SessionResponse {
    fn from(session: InterviewSession) -> Self {
        Self {
            session_id: session.session_id,
            title: session.title,
            role: session.role,
            company: session.company,
            status: session.status,
            created_by: session.created_by,
            participant_roles: session.participant_roles,
            scheduled_at: session.scheduled_at,
            started_at: session.started_at,
            ended_at: session.ended_at,
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ParticipantResponse {
    pub participant_id: String,
    pub session_id: String,
    pub user_id: String,
    pub role: ParticipantRole,
    pub status: ParticipantStatus,
    pub joined_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_at: Option<DateTime<Utc>>,
    pub reconnect_count: i32,
}

impl From<Participant> for ParticipantResponse {
    fn from(participant: Participant) -> Self {
        Self {
            participant_id: participant.participant_id,
            session_id: participant.session_id,
            user_id: participant.user_id,
            role: participant.role,
            status: participant.status,
            joined_at: participant.joined_at,
            left_at: participant.left_at,
            reconnect_count: participant.reconnect_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message_id: String,
    pub session_id: String,
    pub sender_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_role: Option<ParticipantRole>,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            message_id: message.message_id,
            session_id: message.session_id,
            sender_id: message.sender_id,
            sender_role: message.sender_role,
            content: message.content,
            kind: message.kind,
            created_at: message.created_at,
        }
    }
}

/// Result of a lifecycle action; only the parts the action touched are set.
#[derive(Debug, Serialize)]
pub struct SessionActionResponse {
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<ParticipantResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_reply: Option<MessageResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconnected: Option<bool>,
}

impl SessionActionResponse {
    pub fn new(action: &'static str) -> Self {
        Self {
            action,
            session: None,
            participant: None,
            message: None,
            ai_reply: None,
            reconnected: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionDetailResponse {
    pub session: SessionResponse,
    pub participants: Vec<ParticipantResponse>,
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionResponse>,
    pub limit: i64,
    pub offset: u64,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<MessageResponse>,
    pub count: usize,
}
