//! Live interview sessions: lifecycle actions and reads.
//!
//! A session moves `created`/`scheduled` -> `in_progress` -> `ended`. It
//! starts when an interviewer and a candidate are both joined, or when the
//! first message is sent. Interviewer and candidate are single-occupant
//! roles; the store rejects a second joined holder even under concurrent
//! joins, so the checks here only produce the friendlier error early.

use super::metrics;
use super::prompts::{interviewer_prompt, INTERVIEWER_SYSTEM_PROMPT};
use super::providers::{
    generate_recorded, GenerationParams, PromptPurpose, PromptRequest, TextProvider,
};
use super::store::{role_taken, session_ended, InterviewStore, SessionUpdate};
use crate::dtos::{
    CreateSessionRequest, JoinSessionRequest, SendMessageRequest, SessionAction,
    SessionActionResponse, SessionRef,
};
use crate::models::{
    InterviewSession, Message, MessageKind, Participant, ParticipantRole, AI_INTERVIEWER_ID,
};
use chrono::{DateTime, Utc};
use service_core::error::AppError;
use std::sync::Arc;

const SESSION_ENDED_NOTICE: &str = "Session ended";

pub struct SessionService {
    store: Arc<dyn InterviewStore>,
    provider: Arc<dyn TextProvider>,
    params: GenerationParams,
    context_messages: usize,
}

/// A session together with its participant records.
pub struct SessionDetail {
    pub session: InterviewSession,
    pub participants: Vec<Participant>,
}

fn session_not_found(session_id: &str) -> AppError {
    AppError::NotFound(anyhow::anyhow!("Session not found: {}", session_id))
}

/// Roles held by joined participants, in a stable order.
fn joined_roles(participants: &[Participant]) -> Vec<ParticipantRole> {
    [
        ParticipantRole::Interviewer,
        ParticipantRole::Candidate,
        ParticipantRole::Observer,
    ]
    .into_iter()
    .filter(|role| participants.iter().any(|p| p.is_joined() && p.role == *role))
    .collect()
}

/// Both sides of the interview are present.
fn has_core_roles(roles: &[ParticipantRole]) -> bool {
    roles.contains(&ParticipantRole::Interviewer) && roles.contains(&ParticipantRole::Candidate)
}

impl SessionService {
    pub fn new(
        store: Arc<dyn InterviewStore>,
        provider: Arc<dyn TextProvider>,
        params: GenerationParams,
        context_messages: usize,
    ) -> Self {
        Self {
            store,
            provider,
            params,
            context_messages,
        }
    }

    /// Run one lifecycle action on behalf of `user_id`.
    #[tracing::instrument(skip(self, action), fields(action = action.name()))]
    pub async fn execute(
        &self,
        user_id: &str,
        action: SessionAction,
    ) -> Result<SessionActionResponse, AppError> {
        let name = action.name();
        let result = match action {
            SessionAction::Create(request) => self.create(user_id, request).await,
            SessionAction::Join(request) => self.join(user_id, request).await,
            SessionAction::SendMessage(request) => self.send_message(user_id, request).await,
            SessionAction::Leave(request) => self.leave(user_id, request).await,
            SessionAction::End(request) => self.end(user_id, request).await,
        };

        match &result {
            Ok(_) => metrics::record_session_action(name, "success"),
            Err(e) => {
                tracing::info!(error = %e, "Session action rejected");
                metrics::record_session_action(name, "error");
            }
        }
        result
    }

    async fn load_session(&self, session_id: &str) -> Result<InterviewSession, AppError> {
        self.store
            .find_session(session_id)
            .await?
            .ok_or_else(|| session_not_found(session_id))
    }

    /// Write `participant_roles` recomputed from the stored participant
    /// records, starting the session once both core roles are present.
    /// Fails with a conflict if the session ended meanwhile.
    async fn sync_roles(&self, session_id: &str) -> Result<InterviewSession, AppError> {
        let participants = self.store.list_participants(session_id).await?;
        let roles = joined_roles(&participants);
        let update = SessionUpdate {
            start: has_core_roles(&roles),
            participant_roles: Some(roles),
        };
        self.store.update_live_session(session_id, &update).await
    }

    /// Early friendly check; the store enforces the same rule atomically.
    async fn ensure_role_available(
        &self,
        session_id: &str,
        user_id: &str,
        role: ParticipantRole,
    ) -> Result<(), AppError> {
        if !role.is_exclusive() {
            return Ok(());
        }
        let participants = self.store.list_participants(session_id).await?;
        if participants
            .iter()
            .any(|p| p.user_id != user_id && p.holds_exclusive(role))
        {
            return Err(role_taken(role));
        }
        Ok(())
    }

    async fn create(
        &self,
        user_id: &str,
        request: CreateSessionRequest,
    ) -> Result<SessionActionResponse, AppError> {
        let as_role = request.as_role.unwrap_or(ParticipantRole::Interviewer);
        let company = request
            .company
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let mut session = InterviewSession::new(
            request.title.trim().to_string(),
            request.role.trim().to_string(),
            company,
            user_id.to_string(),
            request.scheduled_at,
        );
        session.set_participant_roles(vec![as_role]);
        self.store.insert_session(&session).await?;

        let participant = Participant::new(session.session_id.clone(), user_id.to_string(), as_role);
        self.store.insert_participant(&participant).await?;

        tracing::info!(
            session_id = %session.session_id,
            status = %session.status,
            role = %as_role,
            "Session created"
        );

        let mut response = SessionActionResponse::new("create");
        response.session = Some(session.into());
        response.participant = Some(participant.into());
        Ok(response)
    }

    async fn join(
        &self,
        user_id: &str,
        request: JoinSessionRequest,
    ) -> Result<SessionActionResponse, AppError> {
        let session = self.load_session(&request.session_id).await?;
        if session.is_ended() {
            return Err(session_ended());
        }

        let existing = self
            .store
            .find_participant(&session.session_id, user_id)
            .await?;

        let (mut participant, reconnected) = match existing {
            Some(participant) if participant.is_joined() => {
                if participant.role != request.role {
                    return Err(AppError::Conflict(anyhow::anyhow!(
                        "Already joined this session as {}",
                        participant.role
                    )));
                }
                let mut response = SessionActionResponse::new("join");
                response.session = Some(session.into());
                response.participant = Some(participant.into());
                response.reconnected = Some(false);
                return Ok(response);
            }
            Some(mut participant) => {
                self.ensure_role_available(&session.session_id, user_id, request.role)
                    .await?;
                participant.rejoin(request.role);
                self.store.replace_participant(&participant).await?;
                (participant, true)
            }
            None => {
                self.ensure_role_available(&session.session_id, user_id, request.role)
                    .await?;
                let participant = Participant::new(
                    session.session_id.clone(),
                    user_id.to_string(),
                    request.role,
                );
                self.store.insert_participant(&participant).await?;
                (participant, false)
            }
        };

        let session = match self.sync_roles(&session.session_id).await {
            Ok(updated) => {
                if session.is_pending() && !updated.is_pending() {
                    tracing::info!(session_id = %updated.session_id, "Session started");
                }
                updated
            }
            Err(e) => {
                // The join did not take effect, so the record must not stay joined.
                participant.leave();
                if let Err(rollback) = self.store.replace_participant(&participant).await {
                    tracing::warn!(error = %rollback, "Failed to release participant after join");
                }
                return Err(e);
            }
        };

        tracing::info!(
            session_id = %session.session_id,
            role = %participant.role,
            reconnected,
            reconnect_count = participant.reconnect_count,
            "Participant joined"
        );

        let mut response = SessionActionResponse::new("join");
        response.session = Some(session.into());
        response.participant = Some(participant.into());
        response.reconnected = Some(reconnected);
        Ok(response)
    }

    async fn send_message(
        &self,
        user_id: &str,
        request: SendMessageRequest,
    ) -> Result<SessionActionResponse, AppError> {
        let mut session = self.load_session(&request.session_id).await?;
        if session.is_ended() {
            return Err(session_ended());
        }

        let participant = self
            .store
            .find_participant(&session.session_id, user_id)
            .await?
            .filter(Participant::is_joined)
            .ok_or_else(|| {
                AppError::Forbidden(anyhow::anyhow!(
                    "Only joined participants can send messages"
                ))
            })?;

        if request.kind == MessageKind::System {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "System messages cannot be sent by participants"
            )));
        }

        if session.is_pending() {
            session = self
                .store
                .update_live_session(&session.session_id, &SessionUpdate::start())
                .await?;
            tracing::info!(session_id = %session.session_id, "Session started by first message");
        }

        let message = Message::new(
            session.session_id.clone(),
            user_id.to_string(),
            Some(participant.role),
            request.content.trim().to_string(),
            request.kind,
        );
        self.store.insert_message(&message).await?;

        let ai_reply = if request.request_ai_reply {
            self.interviewer_reply(&session).await
        } else {
            None
        };

        let mut response = SessionActionResponse::new("send_message");
        response.session = Some(session.into());
        response.message = Some(message.into());
        response.ai_reply = ai_reply.map(Into::into);
        Ok(response)
    }

    /// Ask the provider for the interviewer's next turn. Failures are
    /// logged and yield no reply.
    async fn interviewer_reply(&self, session: &InterviewSession) -> Option<Message> {
        let history = match self
            .store
            .recent_messages(&session.session_id, self.context_messages as i64)
            .await
        {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load conversation for AI reply");
                return None;
            }
        };

        let prompt = PromptRequest {
            purpose: PromptPurpose::InterviewerReply,
            system: Some(INTERVIEWER_SYSTEM_PROMPT.to_string()),
            prompt: interviewer_prompt(session, &history),
            params: GenerationParams {
                json_output: false,
                ..self.params.clone()
            },
        };

        let text = match generate_recorded(self.provider.as_ref(), &prompt).await {
            Ok(response) => response.text?,
            Err(e) => {
                tracing::warn!(
                    session_id = %session.session_id,
                    error = %e,
                    "AI interviewer reply failed, continuing without it"
                );
                return None;
            }
        };

        let reply = Message::new(
            session.session_id.clone(),
            AI_INTERVIEWER_ID.to_string(),
            Some(ParticipantRole::Interviewer),
            text.trim().to_string(),
            MessageKind::Question,
        );

        match self.store.insert_message(&reply).await {
            Ok(()) => Some(reply),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to store AI interviewer reply");
                None
            }
        }
    }

    async fn leave(
        &self,
        user_id: &str,
        request: SessionRef,
    ) -> Result<SessionActionResponse, AppError> {
        let mut participant = self
            .store
            .find_participant(&request.session_id, user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!("Not a participant in this session"))
            })?;

        let mut session = self.load_session(&request.session_id).await?;

        if participant.is_joined() {
            participant.leave();
            self.store.replace_participant(&participant).await?;

            if !session.is_ended() {
                session = match self.sync_roles(&session.session_id).await {
                    Ok(updated) => updated,
                    Err(AppError::Conflict(_)) => self.load_session(&request.session_id).await?,
                    Err(e) => return Err(e),
                };
            }
            tracing::info!(session_id = %session.session_id, role = %participant.role, "Participant left");
        }

        let mut response = SessionActionResponse::new("leave");
        response.session = Some(session.into());
        response.participant = Some(participant.into());
        Ok(response)
    }

    async fn end(
        &self,
        user_id: &str,
        request: SessionRef,
    ) -> Result<SessionActionResponse, AppError> {
        let mut session = self.load_session(&request.session_id).await?;

        if session.is_ended() {
            let mut response = SessionActionResponse::new("end");
            response.session = Some(session.into());
            return Ok(response);
        }

        let participants = self.store.list_participants(&session.session_id).await?;
        let is_interviewer = participants
            .iter()
            .any(|p| p.user_id == user_id && p.holds_exclusive(ParticipantRole::Interviewer));
        if session.created_by != user_id && !is_interviewer {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "Only the creator or the interviewer can end this session"
            )));
        }

        for mut participant in participants.into_iter().filter(Participant::is_joined) {
            participant.leave();
            self.store.replace_participant(&participant).await?;
        }

        session.end();
        self.store.replace_session(&session).await?;

        let notice = Message::system(session.session_id.clone(), SESSION_ENDED_NOTICE.to_string());
        self.store.insert_message(&notice).await?;

        tracing::info!(session_id = %session.session_id, "Session ended");

        let mut response = SessionActionResponse::new("end");
        response.session = Some(session.into());
        response.message = Some(notice.into());
        Ok(response)
    }

    /// Session detail, visible to its creator and anyone with a
    /// participant record.
    pub async fn get(&self, user_id: &str, session_id: &str) -> Result<SessionDetail, AppError> {
        let session = self.load_session(session_id).await?;
        let participants = self.store.list_participants(session_id).await?;

        if session.created_by != user_id && !participants.iter().any(|p| p.user_id == user_id) {
            return Err(AppError::Forbidden(anyhow::anyhow!(
                "Not a member of this session"
            )));
        }

        Ok(SessionDetail {
            session,
            participants,
        })
    }

    pub async fn list(
        &self,
        user_id: &str,
        limit: i64,
        offset: u64,
    ) -> Result<Vec<InterviewSession>, AppError> {
        self.store.list_sessions_for_user(user_id, limit, offset).await
    }

    pub async fn messages(
        &self,
        user_id: &str,
        session_id: &str,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<Message>, AppError> {
        self.get(user_id, session_id).await?;
        self.store.list_messages(session_id, since, limit).await
    }
}
