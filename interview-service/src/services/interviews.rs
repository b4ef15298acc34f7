//! Interview question generation and answer feedback.

use super::metrics;
use super::prompts::{
    feedback_prompt, parse_feedback, parse_questions, question_prompt, QuestionBrief,
    FEEDBACK_SYSTEM_PROMPT, QUESTION_SYSTEM_PROMPT,
};
use super::providers::{
    generate_recorded, GenerationParams, PromptPurpose, PromptRequest, TextProvider,
};
use super::store::InterviewStore;
use crate::dtos::{AnswerInput, GenerateInterviewRequest};
use crate::models::{AnswerRecord, Feedback, Interview};
use chrono::Utc;
use service_core::error::AppError;
use std::collections::HashSet;
use std::sync::Arc;

pub struct InterviewService {
    store: Arc<dyn InterviewStore>,
    provider: Arc<dyn TextProvider>,
    params: GenerationParams,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn interview_not_found(interview_id: &str) -> AppError {
    AppError::NotFound(anyhow::anyhow!("Interview not found: {}", interview_id))
}

impl InterviewService {
    pub fn new(
        store: Arc<dyn InterviewStore>,
        provider: Arc<dyn TextProvider>,
        params: GenerationParams,
    ) -> Self {
        Self {
            store,
            provider,
            params,
        }
    }

    fn prompt(&self, purpose: PromptPurpose, system: &str, prompt: String) -> PromptRequest {
        PromptRequest {
            purpose,
            system: Some(system.to_string()),
            prompt,
            params: GenerationParams {
                json_output: true,
                ..self.params.clone()
            },
        }
    }

    /// Generate and store a new set of practice questions.
    #[tracing::instrument(skip(self, request), fields(role = %request.role))]
    pub async fn generate(
        &self,
        user_id: &str,
        request: GenerateInterviewRequest,
    ) -> Result<Interview, AppError> {
        let role = request.role.trim().to_string();
        let company = trimmed(request.company);
        let job_description = trimmed(request.job_description);
        let tech_stack: Vec<String> = request
            .tech_stack
            .iter()
            .map(|t| t.trim().to_string())
            .collect();
        let count = request.question_count as usize;

        let brief = QuestionBrief {
            role: &role,
            company: company.as_deref(),
            experience_level: request.experience_level,
            interview_type: request.interview_type,
            tech_stack: &tech_stack,
            job_description: job_description.as_deref(),
            count,
        };
        let prompt = self.prompt(
            PromptPurpose::Questions,
            QUESTION_SYSTEM_PROMPT,
            question_prompt(&brief),
        );

        let response = generate_recorded(self.provider.as_ref(), &prompt)
            .await
            .inspect_err(|_| metrics::record_interview_generation("provider_error"))?;

        let drafts = response
            .text
            .as_deref()
            .map(|raw| parse_questions(raw, count))
            .unwrap_or_default();

        if drafts.is_empty() {
            metrics::record_interview_generation("unparsable");
            tracing::warn!("AI provider returned no usable questions");
            return Err(AppError::BadGateway(
                "AI provider returned no usable questions".to_string(),
            ));
        }

        let mut interview = Interview::new(
            user_id.to_string(),
            role,
            company,
            request.experience_level,
            request.interview_type,
            tech_stack,
            job_description,
            self.provider.model().to_string(),
        );
        for draft in drafts {
            interview.add_question(draft.text, draft.category, draft.difficulty);
        }

        self.store
            .insert_interview(&interview)
            .await
            .inspect_err(|_| metrics::record_interview_generation("store_error"))?;

        metrics::record_interview_generation("success");
        tracing::info!(
            interview_id = %interview.interview_id,
            questions = interview.questions.len(),
            "Interview generated"
        );

        Ok(interview)
    }

    pub async fn get(&self, user_id: &str, interview_id: &str) -> Result<Interview, AppError> {
        self.store
            .find_interview(interview_id, user_id)
            .await?
            .ok_or_else(|| interview_not_found(interview_id))
    }

    pub async fn list(
        &self,
        user_id: &str,
        limit: i64,
        offset: u64,
    ) -> Result<Vec<Interview>, AppError> {
        self.store.list_interviews(user_id, limit, offset).await
    }

    /// Delete an interview together with its feedback.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, user_id: &str, interview_id: &str) -> Result<(), AppError> {
        if !self.store.delete_interview(interview_id, user_id).await? {
            return Err(interview_not_found(interview_id));
        }

        let removed = self.store.delete_feedback_for_interview(interview_id).await?;
        tracing::info!(feedback_removed = removed, "Interview deleted");
        Ok(())
    }

    /// Ask the provider to assess a round of answers.
    ///
    /// Returns the feedback and whether it was persisted. A failed write is
    /// logged and does not fail the request.
    #[tracing::instrument(skip(self, answers), fields(answers = answers.len()))]
    pub async fn submit_answers(
        &self,
        user_id: &str,
        interview_id: &str,
        answers: Vec<AnswerInput>,
    ) -> Result<(Feedback, bool), AppError> {
        let interview = self.get(user_id, interview_id).await?;

        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(answers.len());
        for answer in answers {
            let question = interview.question(&answer.question_id).ok_or_else(|| {
                AppError::BadRequest(anyhow::anyhow!(
                    "Question {} does not belong to this interview",
                    answer.question_id
                ))
            })?;
            if !seen.insert(answer.question_id.clone()) {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "Question {} was answered more than once",
                    answer.question_id
                )));
            }
            records.push(AnswerRecord {
                question_id: answer.question_id,
                question: question.text.clone(),
                answer: answer.answer.trim().to_string(),
            });
        }

        let prompt = self.prompt(
            PromptPurpose::Feedback,
            FEEDBACK_SYSTEM_PROMPT,
            feedback_prompt(&interview, &records),
        );

        let response = generate_recorded(self.provider.as_ref(), &prompt)
            .await
            .inspect_err(|_| metrics::record_feedback_generation("provider_error"))?;

        let Some(raw) = response.text else {
            metrics::record_feedback_generation("empty");
            return Err(AppError::BadGateway(
                "AI provider returned no feedback".to_string(),
            ));
        };

        let mut report = parse_feedback(&raw);
        report
            .question_feedback
            .retain(|qf| seen.contains(&qf.question_id));

        let feedback = Feedback {
            id: None,
            feedback_id: uuid::Uuid::new_v4().to_string(),
            interview_id: interview.interview_id.clone(),
            user_id: user_id.to_string(),
            overall_score: report.overall_score,
            summary: report.summary,
            strengths: report.strengths,
            improvements: report.improvements,
            question_feedback: report.question_feedback,
            answers: records,
            model: self.provider.model().to_string(),
            created_at: Utc::now(),
        };

        let saved = match self.store.insert_feedback(&feedback).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    feedback_id = %feedback.feedback_id,
                    error = %e,
                    "Failed to persist feedback, returning it unsaved"
                );
                false
            }
        };

        metrics::record_feedback_generation(if saved { "success" } else { "unsaved" });
        Ok((feedback, saved))
    }

    pub async fn list_feedback(
        &self,
        user_id: &str,
        interview_id: &str,
    ) -> Result<Vec<Feedback>, AppError> {
        // Existence check keeps foreign interviews indistinguishable from
        // missing ones.
        self.get(user_id, interview_id).await?;
        self.store.list_feedback(interview_id, user_id).await
    }
}
