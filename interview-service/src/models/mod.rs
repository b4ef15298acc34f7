//! Domain documents persisted by the interview service.

pub mod feedback;
pub mod interview;
pub mod message;
pub mod participant;
pub mod session;

pub use feedback::{AnswerRecord, Feedback, QuestionFeedback};
pub use interview::{ExperienceLevel, Interview, InterviewType, Question};
pub use message::{Message, MessageKind, AI_INTERVIEWER_ID, SYSTEM_SENDER_ID};
pub use participant::{Participant, ParticipantRole, ParticipantStatus};
pub use session::{InterviewSession, SessionStatus};

// Helper module for optional DateTime<Utc> as BSON DateTime
pub(crate) mod opt_chrono_datetime_as_bson_datetime {
    use chrono::{DateTime, Utc};
    use mongodb::bson;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(dt) => bson::DateTime::from_chrono(*dt).serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<bson::DateTime> = Option::deserialize(deserializer)?;
        Ok(opt.map(|dt| dt.to_chrono()))
    }
}
