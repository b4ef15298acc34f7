use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Junior,
    #[default]
    Mid,
    Senior,
    Lead,
}

impl std::fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExperienceLevel::Junior => write!(f, "junior"),
            ExperienceLevel::Mid => write!(f, "mid"),
            ExperienceLevel::Senior => write!(f, "senior"),
            ExperienceLevel::Lead => write!(f, "lead"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InterviewType {
    Technical,
    Behavioral,
    #[default]
    Mixed,
}

impl std::fmt::Display for InterviewType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterviewType::Technical => write!(f, "technical"),
            InterviewType::Behavioral => write!(f, "behavioral"),
            InterviewType::Mixed => write!(f, "mixed"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub question_id: String,
    pub number: i32,
    pub text: String,
    pub category: String,
    pub difficulty: String,
}

/// A generated set of practice questions for one target role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interview {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub interview_id: String,
    pub user_id: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub experience_level: ExperienceLevel,
    pub interview_type: InterviewType,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    pub questions: Vec<Question>,
    pub model: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Interview {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: String,
        role: String,
        company: Option<String>,
        experience_level: ExperienceLevel,
        interview_type: InterviewType,
        tech_stack: Vec<String>,
        job_description: Option<String>,
        model: String,
    ) -> Self {
        Self {
            id: None,
            interview_id: uuid::Uuid::new_v4().to_string(),
            user_id,
            role,
            company,
            experience_level,
            interview_type,
            tech_stack,
            job_description,
            questions: Vec::new(),
            model,
            created_at: Utc::now(),
        }
    }

    /// Append a question, numbering it after the existing ones.
    pub fn add_question(&mut self, text: String, category: String, difficulty: String) {
        let number = self.questions.len() as i32 + 1;
        self.questions.push(Question {
            question_id: uuid::Uuid::new_v4().to_string(),
            number,
            text,
            category,
            difficulty,
        });
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.question_id == question_id)
    }
}
