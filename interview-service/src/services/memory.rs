//! In-process [`InterviewStore`] used for local runs and the test suite.

use super::store::{
    already_participant, role_taken, session_ended, InterviewStore, SessionUpdate,
};
use crate::models::{Feedback, Interview, InterviewSession, Message, Participant};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct MemoryState {
    interviews: Vec<Interview>,
    feedback: Vec<Feedback>,
    sessions: HashMap<String, InterviewSession>,
    participants: Vec<Participant>,
    messages: Vec<Message>,
}

impl MemoryState {
    /// Checks the same constraints the MongoDB unique indexes enforce.
    fn check_participant(&self, candidate: &Participant) -> Result<(), AppError> {
        for existing in &self.participants {
            if existing.participant_id == candidate.participant_id
                || existing.session_id != candidate.session_id
            {
                continue;
            }
            if existing.user_id == candidate.user_id {
                return Err(already_participant());
            }
            if candidate.is_joined()
                && candidate.exclusive
                && existing.holds_exclusive(candidate.role)
            {
                return Err(role_taken(candidate.role));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page<T: Clone>(items: Vec<&T>, limit: i64, offset: u64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset as usize)
        .take(limit.max(0) as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl InterviewStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn insert_interview(&self, interview: &Interview) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        if state
            .interviews
            .iter()
            .any(|i| i.interview_id == interview.interview_id)
        {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Interview already exists: {}",
                interview.interview_id
            )));
        }
        state.interviews.push(interview.clone());
        Ok(())
    }

    async fn find_interview(
        &self,
        interview_id: &str,
        user_id: &str,
    ) -> Result<Option<Interview>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .interviews
            .iter()
            .find(|i| i.interview_id == interview_id && i.user_id == user_id)
            .cloned())
    }

    async fn list_interviews(
        &self,
        user_id: &str,
        limit: i64,
        offset: u64,
    ) -> Result<Vec<Interview>, AppError> {
        let state = self.state.read().await;
        let mut owned: Vec<&Interview> = state
            .interviews
            .iter()
            .filter(|i| i.user_id == user_id)
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(owned, limit, offset))
    }

    async fn delete_interview(&self, interview_id: &str, user_id: &str) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let before = state.interviews.len();
        state
            .interviews
            .retain(|i| !(i.interview_id == interview_id && i.user_id == user_id));
        Ok(state.interviews.len() < before)
    }

    async fn insert_feedback(&self, feedback: &Feedback) -> Result<(), AppError> {
        self.state.write().await.feedback.push(feedback.clone());
        Ok(())
    }

    async fn list_feedback(
        &self,
        interview_id: &str,
        user_id: &str,
    ) -> Result<Vec<Feedback>, AppError> {
        let state = self.state.read().await;
        let mut found: Vec<Feedback> = state
            .feedback
            .iter()
            .filter(|f| f.interview_id == interview_id && f.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn delete_feedback_for_interview(&self, interview_id: &str) -> Result<u64, AppError> {
        let mut state = self.state.write().await;
        let before = state.feedback.len();
        state.feedback.retain(|f| f.interview_id != interview_id);
        Ok((before - state.feedback.len()) as u64)
    }

    async fn insert_session(&self, session: &InterviewSession) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        if state.sessions.contains_key(&session.session_id) {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Session already exists: {}",
                session.session_id
            )));
        }
        state
            .sessions
            .insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    async fn find_session(&self, session_id: &str) -> Result<Option<InterviewSession>, AppError> {
        Ok(self.state.read().await.sessions.get(session_id).cloned())
    }

    async fn replace_session(&self, session: &InterviewSession) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        match state.sessions.get_mut(&session.session_id) {
            Some(stored) => {
                *stored = session.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(anyhow::anyhow!(
                "Session not found: {}",
                session.session_id
            ))),
        }
    }

    async fn update_live_session(
        &self,
        session_id: &str,
        update: &SessionUpdate,
    ) -> Result<InterviewSession, AppError> {
        let mut state = self.state.write().await;
        let session = state.sessions.get_mut(session_id).ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Session not found: {}", session_id))
        })?;
        if session.is_ended() {
            return Err(session_ended());
        }

        if let Some(roles) = &update.participant_roles {
            session.set_participant_roles(roles.clone());
        }
        if update.start {
            session.start();
        }
        Ok(session.clone())
    }

    async fn list_sessions_for_user(
        &self,
        user_id: &str,
        limit: i64,
        offset: u64,
    ) -> Result<Vec<InterviewSession>, AppError> {
        let state = self.state.read().await;
        let mut visible: Vec<&InterviewSession> = state
            .sessions
            .values()
            .filter(|s| {
                s.created_by == user_id
                    || state
                        .participants
                        .iter()
                        .any(|p| p.session_id == s.session_id && p.user_id == user_id)
            })
            .collect();
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(visible, limit, offset))
    }

    async fn insert_participant(&self, participant: &Participant) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        state.check_participant(participant)?;
        state.participants.push(participant.clone());
        Ok(())
    }

    async fn find_participant(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> Result<Option<Participant>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .participants
            .iter()
            .find(|p| p.session_id == session_id && p.user_id == user_id)
            .cloned())
    }

    async fn list_participants(&self, session_id: &str) -> Result<Vec<Participant>, AppError> {
        let state = self.state.read().await;
        let mut found: Vec<Participant> = state
            .participants
            .iter()
            .filter(|p| p.session_id == session_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));
        Ok(found)
    }

    async fn replace_participant(&self, participant: &Participant) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        state.check_participant(participant)?;
        match state
            .participants
            .iter_mut()
            .find(|p| p.participant_id == participant.participant_id)
        {
            Some(stored) => {
                *stored = participant.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(anyhow::anyhow!(
                "Participant not found: {}",
                participant.participant_id
            ))),
        }
    }

    async fn insert_message(&self, message: &Message) -> Result<(), AppError> {
        self.state.write().await.messages.push(message.clone());
        Ok(())
    }

    async fn list_messages(
        &self,
        session_id: &str,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<Message>, AppError> {
        let state = self.state.read().await;
        let mut found: Vec<&Message> = state
            .messages
            .iter()
            .filter(|m| m.session_id == session_id)
            .filter(|m| since.is_none_or(|since| m.created_at > since))
            .collect();
        // Timestamps are taken before the lock, so insertion order can differ.
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(found
            .into_iter()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn recent_messages(
        &self,
        session_id: &str,
        count: i64,
    ) -> Result<Vec<Message>, AppError> {
        let state = self.state.read().await;
        let mut session_messages: Vec<&Message> = state
            .messages
            .iter()
            .filter(|m| m.session_id == session_id)
            .collect();
        session_messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let skip = session_messages.len().saturating_sub(count.max(0) as usize);
        Ok(session_messages.into_iter().skip(skip).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MessageKind, ParticipantRole, SessionStatus};

    fn participant(session: &str, user: &str, role: ParticipantRole) -> Participant {
        Participant::new(session.to_string(), user.to_string(), role)
    }

    #[tokio::test]
    async fn rejects_second_record_for_same_user() {
        let store = MemoryStore::new();
        store
            .insert_participant(&participant("s1", "alice", ParticipantRole::Observer))
            .await
            .unwrap();

        let err = store
            .insert_participant(&participant("s1", "alice", ParticipantRole::Candidate))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Same user in another session is fine.
        store
            .insert_participant(&participant("s2", "alice", ParticipantRole::Candidate))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn exclusive_role_held_once_per_session() {
        let store = MemoryStore::new();
        store
            .insert_participant(&participant("s1", "alice", ParticipantRole::Candidate))
            .await
            .unwrap();

        let err = store
            .insert_participant(&participant("s1", "bob", ParticipantRole::Candidate))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        store
            .insert_participant(&participant("s1", "carol", ParticipantRole::Observer))
            .await
            .unwrap();
        store
            .insert_participant(&participant("s1", "dave", ParticipantRole::Observer))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn left_holder_frees_the_role() {
        let store = MemoryStore::new();
        let mut alice = participant("s1", "alice", ParticipantRole::Interviewer);
        store.insert_participant(&alice).await.unwrap();

        alice.leave();
        store.replace_participant(&alice).await.unwrap();

        let bob = participant("s1", "bob", ParticipantRole::Interviewer);
        store.insert_participant(&bob).await.unwrap();

        // Alice cannot reclaim the role while Bob holds it.
        alice.rejoin(ParticipantRole::Interviewer);
        let err = store.replace_participant(&alice).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn recent_messages_keep_chronological_order() {
        let store = MemoryStore::new();
        for i in 0..5 {
            let msg = Message::new(
                "s1".into(),
                "alice".into(),
                Some(ParticipantRole::Candidate),
                format!("message {}", i),
                MessageKind::Text,
            );
            store.insert_message(&msg).await.unwrap();
        }

        let recent = store.recent_messages("s1", 2).await.unwrap();
        let contents: Vec<_> = recent.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["message 3", "message 4"]);

        let limited = store.list_messages("s1", None, 3).await.unwrap();
        assert_eq!(limited.len(), 3);
        assert_eq!(limited[0].content, "message 0");
    }

    #[tokio::test]
    async fn messages_are_ordered_by_timestamp_not_insertion() {
        let store = MemoryStore::new();
        let text = |content: &str| {
            Message::new(
                "s1".into(),
                "alice".into(),
                Some(ParticipantRole::Candidate),
                content.to_string(),
                MessageKind::Text,
            )
        };
        let earlier = text("earlier");
        let mut later = text("later");
        later.created_at = earlier.created_at + chrono::Duration::seconds(1);
        let mut first = text("first");
        first.created_at = earlier.created_at - chrono::Duration::seconds(10);

        // Stored out of timestamp order.
        store.insert_message(&later).await.unwrap();
        store.insert_message(&earlier).await.unwrap();
        store.insert_message(&first).await.unwrap();

        let all = store.list_messages("s1", None, 10).await.unwrap();
        let contents: Vec<_> = all.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "earlier", "later"]);

        let since_first = store
            .list_messages("s1", Some(first.created_at), 1)
            .await
            .unwrap();
        assert_eq!(since_first[0].content, "earlier");

        let recent = store.recent_messages("s1", 1).await.unwrap();
        assert_eq!(recent[0].content, "later");
    }

    #[tokio::test]
    async fn ended_sessions_refuse_live_updates() {
        let store = MemoryStore::new();
        let mut session = InterviewSession::new(
            "Loop".to_string(),
            "SRE".to_string(),
            None,
            "alice".to_string(),
            None,
        );
        store.insert_session(&session).await.unwrap();

        let started = store
            .update_live_session(
                &session.session_id,
                &SessionUpdate {
                    participant_roles: Some(vec![
                        ParticipantRole::Interviewer,
                        ParticipantRole::Candidate,
                    ]),
                    start: true,
                },
            )
            .await
            .unwrap();
        assert_eq!(started.status, SessionStatus::InProgress);
        assert_eq!(started.participant_roles.len(), 2);

        session.end();
        store.replace_session(&session).await.unwrap();

        let err = store
            .update_live_session(&session.session_id, &SessionUpdate::start())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let stored = store
            .find_session(&session.session_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, SessionStatus::Ended);
        assert!(stored.ended_at.is_some());

        let err = store
            .update_live_session("missing", &SessionUpdate::start())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
