//! MongoDB-backed [`InterviewStore`].

use super::store::{
    already_participant, role_taken, session_ended, InterviewStore, SessionUpdate,
};
use crate::models::{Feedback, Interview, InterviewSession, Message, Participant};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, DateTime as BsonDateTime, Document},
    error::{ErrorKind, WriteFailure},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

const DUPLICATE_KEY_CODE: i32 = 11000;
const EXCLUSIVE_ROLE_INDEX: &str = "session_exclusive_role_idx";

#[derive(Clone)]
pub struct MongoStore {
    client: MongoClient,
    db: Database,
}

fn db_error(action: &'static str) -> impl Fn(mongodb::error::Error) -> AppError {
    move |e| {
        tracing::error!("Failed to {}: {}", action, e);
        AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
    }
}

/// Duplicate-key write error, with the server message.
fn duplicate_key_message(err: &mongodb::error::Error) -> Option<&str> {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE =>
        {
            Some(write_error.message.as_str())
        }
        _ => None,
    }
}

/// Map a participant write failure onto the uniqueness conflicts it encodes.
fn participant_write_error(participant: &Participant, err: mongodb::error::Error) -> AppError {
    match duplicate_key_message(&err) {
        Some(message) if message.contains(EXCLUSIVE_ROLE_INDEX) => {
            tracing::warn!(
                session_id = %participant.session_id,
                role = %participant.role,
                "Exclusive role already held"
            );
            role_taken(participant.role)
        }
        Some(_) => already_participant(),
        None => db_error("write participant")(err),
    }
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!("Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for interview-service");

        create_index(&self.interviews(), doc! { "interview_id": 1 }, "interview_id_idx", true).await?;
        create_index(
            &self.interviews(),
            doc! { "user_id": 1, "created_at": -1 },
            "user_created_idx",
            false,
        )
        .await?;

        create_index(&self.feedback(), doc! { "feedback_id": 1 }, "feedback_id_idx", true).await?;
        create_index(
            &self.feedback(),
            doc! { "interview_id": 1, "created_at": -1 },
            "interview_created_idx",
            false,
        )
        .await?;

        create_index(&self.sessions(), doc! { "session_id": 1 }, "session_id_idx", true).await?;
        create_index(
            &self.sessions(),
            doc! { "created_by": 1, "created_at": -1 },
            "created_by_idx",
            false,
        )
        .await?;

        create_index(
            &self.participants(),
            doc! { "session_id": 1, "user_id": 1 },
            "session_user_idx",
            true,
        )
        .await?;
        create_index(&self.participants(), doc! { "user_id": 1 }, "participant_user_idx", false)
            .await?;

        // One joined holder per exclusive role and session. Left participants
        // and observers fall outside the partial filter.
        let exclusive_role_index = IndexModel::builder()
            .keys(doc! { "session_id": 1, "role": 1 })
            .options(
                IndexOptions::builder()
                    .name(EXCLUSIVE_ROLE_INDEX.to_string())
                    .unique(true)
                    .partial_filter_expression(doc! { "status": "joined", "exclusive": true })
                    .build(),
            )
            .build();
        self.participants()
            .create_index(exclusive_role_index, None)
            .await
            .map_err(db_error("create exclusive role index"))?;

        create_index(
            &self.messages(),
            doc! { "session_id": 1, "created_at": 1 },
            "session_created_idx",
            false,
        )
        .await?;

        tracing::info!("Successfully created all MongoDB indexes");
        Ok(())
    }

    // Collection accessors

    pub fn interviews(&self) -> Collection<Interview> {
        self.db.collection("interviews")
    }

    pub fn feedback(&self) -> Collection<Feedback> {
        self.db.collection("feedback")
    }

    pub fn sessions(&self) -> Collection<InterviewSession> {
        self.db.collection("sessions")
    }

    pub fn participants(&self) -> Collection<Participant> {
        self.db.collection("participants")
    }

    pub fn messages(&self) -> Collection<Message> {
        self.db.collection("messages")
    }
}

async fn create_index<T>(
    collection: &Collection<T>,
    keys: Document,
    name: &str,
    unique: bool,
) -> Result<(), AppError>
where
    T: Send + Sync,
{
    let index = IndexModel::builder()
        .keys(keys)
        .options(
            IndexOptions::builder()
                .name(name.to_string())
                .unique(unique)
                .build(),
        )
        .build();

    collection.create_index(index, None).await.map_err(|e| {
        tracing::error!("Failed to create {} index: {}", name, e);
        AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
    })?;

    Ok(())
}

fn newest_first(limit: i64, offset: u64) -> FindOptions {
    FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .limit(limit)
        .skip(offset)
        .build()
}

#[async_trait]
impl InterviewStore for MongoStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(db_error("ping MongoDB"))?;
        Ok(())
    }

    async fn insert_interview(&self, interview: &Interview) -> Result<(), AppError> {
        self.interviews()
            .insert_one(interview, None)
            .await
            .map_err(db_error("insert interview"))?;
        Ok(())
    }

    async fn find_interview(
        &self,
        interview_id: &str,
        user_id: &str,
    ) -> Result<Option<Interview>, AppError> {
        self.interviews()
            .find_one(doc! { "interview_id": interview_id, "user_id": user_id }, None)
            .await
            .map_err(db_error("find interview"))
    }

    async fn list_interviews(
        &self,
        user_id: &str,
        limit: i64,
        offset: u64,
    ) -> Result<Vec<Interview>, AppError> {
        let cursor = self
            .interviews()
            .find(doc! { "user_id": user_id }, newest_first(limit, offset))
            .await
            .map_err(db_error("list interviews"))?;

        cursor
            .try_collect()
            .await
            .map_err(db_error("collect interviews"))
    }

    async fn delete_interview(&self, interview_id: &str, user_id: &str) -> Result<bool, AppError> {
        let result = self
            .interviews()
            .delete_one(doc! { "interview_id": interview_id, "user_id": user_id }, None)
            .await
            .map_err(db_error("delete interview"))?;
        Ok(result.deleted_count > 0)
    }

    async fn insert_feedback(&self, feedback: &Feedback) -> Result<(), AppError> {
        self.feedback()
            .insert_one(feedback, None)
            .await
            .map_err(db_error("insert feedback"))?;
        Ok(())
    }

    async fn list_feedback(
        &self,
        interview_id: &str,
        user_id: &str,
    ) -> Result<Vec<Feedback>, AppError> {
        let options = FindOptions::builder().sort(doc! { "created_at": -1 }).build();
        let cursor = self
            .feedback()
            .find(
                doc! { "interview_id": interview_id, "user_id": user_id },
                options,
            )
            .await
            .map_err(db_error("list feedback"))?;

        cursor.try_collect().await.map_err(db_error("collect feedback"))
    }

    async fn delete_feedback_for_interview(&self, interview_id: &str) -> Result<u64, AppError> {
        let result = self
            .feedback()
            .delete_many(doc! { "interview_id": interview_id }, None)
            .await
            .map_err(db_error("delete feedback"))?;
        Ok(result.deleted_count)
    }

    async fn insert_session(&self, session: &InterviewSession) -> Result<(), AppError> {
        self.sessions()
            .insert_one(session, None)
            .await
            .map_err(db_error("insert session"))?;
        Ok(())
    }

    async fn find_session(&self, session_id: &str) -> Result<Option<InterviewSession>, AppError> {
        self.sessions()
            .find_one(doc! { "session_id": session_id }, None)
            .await
            .map_err(db_error("find session"))
    }

    async fn replace_session(&self, session: &InterviewSession) -> Result<(), AppError> {
        let result = self
            .sessions()
            .replace_one(doc! { "session_id": &session.session_id }, session, None)
            .await
            .map_err(db_error("replace session"))?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Session not found: {}",
                session.session_id
            )));
        }
        Ok(())
    }

    async fn update_live_session(
        &self,
        session_id: &str,
        update: &SessionUpdate,
    ) -> Result<InterviewSession, AppError> {
        let now = BsonDateTime::from_chrono(Utc::now());
        let mut set = doc! { "updated_at": now };
        if let Some(roles) = &update.participant_roles {
            let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
            set.insert("participant_roles", roles);
        }
        if update.start {
            let pending = doc! { "$in": ["$status", ["created", "scheduled"]] };
            set.insert(
                "status",
                doc! { "$cond": [pending.clone(), "in_progress", "$status"] },
            );
            set.insert("started_at", doc! { "$cond": [pending, now, "$started_at"] });
        }

        // Pipeline form so the start transition is decided in the same write.
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .sessions()
            .find_one_and_update(
                doc! { "session_id": session_id, "status": { "$ne": "ended" } },
                vec![doc! { "$set": set }],
                options,
            )
            .await
            .map_err(db_error("update session"))?;

        match updated {
            Some(session) => Ok(session),
            None => match self.find_session(session_id).await? {
                Some(_) => Err(session_ended()),
                None => Err(AppError::NotFound(anyhow::anyhow!(
                    "Session not found: {}",
                    session_id
                ))),
            },
        }
    }

    async fn list_sessions_for_user(
        &self,
        user_id: &str,
        limit: i64,
        offset: u64,
    ) -> Result<Vec<InterviewSession>, AppError> {
        let participations: Vec<Participant> = self
            .participants()
            .find(doc! { "user_id": user_id }, None)
            .await
            .map_err(db_error("find participations"))?
            .try_collect()
            .await
            .map_err(db_error("collect participations"))?;

        let session_ids: Vec<String> = participations.into_iter().map(|p| p.session_id).collect();

        let filter = doc! {
            "$or": [
                { "created_by": user_id },
                { "session_id": { "$in": session_ids } },
            ]
        };

        let cursor = self
            .sessions()
            .find(filter, newest_first(limit, offset))
            .await
            .map_err(db_error("list sessions"))?;

        cursor.try_collect().await.map_err(db_error("collect sessions"))
    }

    async fn insert_participant(&self, participant: &Participant) -> Result<(), AppError> {
        self.participants()
            .insert_one(participant, None)
            .await
            .map_err(|e| participant_write_error(participant, e))?;
        Ok(())
    }

    async fn find_participant(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> Result<Option<Participant>, AppError> {
        self.participants()
            .find_one(doc! { "session_id": session_id, "user_id": user_id }, None)
            .await
            .map_err(db_error("find participant"))
    }

    async fn list_participants(&self, session_id: &str) -> Result<Vec<Participant>, AppError> {
        let options = FindOptions::builder().sort(doc! { "joined_at": 1 }).build();
        let cursor = self
            .participants()
            .find(doc! { "session_id": session_id }, options)
            .await
            .map_err(db_error("list participants"))?;

        cursor
            .try_collect()
            .await
            .map_err(db_error("collect participants"))
    }

    async fn replace_participant(&self, participant: &Participant) -> Result<(), AppError> {
        let result = self
            .participants()
            .replace_one(
                doc! { "participant_id": &participant.participant_id },
                participant,
                None,
            )
            .await
            .map_err(|e| participant_write_error(participant, e))?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Participant not found: {}",
                participant.participant_id
            )));
        }
        Ok(())
    }

    async fn insert_message(&self, message: &Message) -> Result<(), AppError> {
        self.messages()
            .insert_one(message, None)
            .await
            .map_err(db_error("insert message"))?;
        Ok(())
    }

    async fn list_messages(
        &self,
        session_id: &str,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<Message>, AppError> {
        let mut filter = doc! { "session_id": session_id };
        if let Some(since) = since {
            filter.insert("created_at", doc! { "$gt": BsonDateTime::from_chrono(since) });
        }

        let options = FindOptions::builder()
            .sort(doc! { "created_at": 1 })
            .limit(limit)
            .build();

        let cursor = self
            .messages()
            .find(filter, options)
            .await
            .map_err(db_error("list messages"))?;

        cursor.try_collect().await.map_err(db_error("collect messages"))
    }

    async fn recent_messages(
        &self,
        session_id: &str,
        count: i64,
    ) -> Result<Vec<Message>, AppError> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .limit(count)
            .build();

        let mut messages: Vec<Message> = self
            .messages()
            .find(doc! { "session_id": session_id }, options)
            .await
            .map_err(db_error("find recent messages"))?
            .try_collect()
            .await
            .map_err(db_error("collect recent messages"))?;

        messages.reverse();
        Ok(messages)
    }
}
