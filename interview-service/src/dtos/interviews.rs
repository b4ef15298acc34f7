use super::{entries_not_blank, not_blank};
use crate::models::{ExperienceLevel, Interview, InterviewType, Question};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_QUESTION_COUNT: u32 = 5;

fn default_question_count() -> u32 {
    DEFAULT_QUESTION_COUNT
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateInterviewRequest {
    #[validate(
        length(min = 1, max = 120, message = "Role must be 1-120 characters"),
        custom(function = "not_blank")
    )]
    pub role: String,

    #[validate(length(max = 120, message = "Company must be at most 120 characters"))]
    pub company: Option<String>,

    #[serde(default)]
    pub experience_level: ExperienceLevel,

    #[serde(default)]
    pub interview_type: InterviewType,

    #[serde(default)]
    #[validate(
        length(max = 20, message = "At most 20 tech stack entries"),
        custom(function = "entries_not_blank")
    )]
    pub tech_stack: Vec<String>,

    #[validate(length(max = 5000, message = "Job description must be at most 5000 characters"))]
    pub job_description: Option<String>,

    #[serde(default = "default_question_count")]
    #[validate(range(min = 1, max = 20, message = "Question count must be between 1 and 20"))]
    pub question_count: u32,
}

#[derive(Debug, Serialize)]
pub struct InterviewResponse {
    pub interview_id: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub experience_level: ExperienceLevel,
    pub interview_type: InterviewType,
    pub tech_stack: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    pub questions: Vec<Question>,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

impl From<Interview> for InterviewResponse {
    fn from(interview: Interview) -> Self {
        Self {
            interview_id: interview.interview_id,
            role: interview.role,
            company: interview.company,
            experience_level: interview.experience_level,
            interview_type: interview.interview_type,
            tech_stack: interview.tech_stack,
            job_description: interview.job_description,
            questions: interview.questions,
            model: interview.model,
            created_at: interview.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InterviewListResponse {
    pub interviews: Vec<InterviewResponse>,
    pub limit: i64,
    pub offset: u64,
    pub count: usize,
}
