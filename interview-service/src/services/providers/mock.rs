//! Mock provider implementation for local runs and testing.

use super::{
    FinishReason, PromptPurpose, PromptRequest, ProviderError, ProviderResponse, TextProvider,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

pub const MOCK_MODEL: &str = "mock-interviewer";

const CANNED_QUESTIONS: &str = r#"[
  {"question": "Walk me through a project you are proud of.", "category": "experience", "difficulty": "easy"},
  {"question": "How would you design a rate limiter for a public API?", "category": "system design", "difficulty": "medium"},
  {"question": "Tell me about a time you disagreed with a teammate.", "category": "behavioral", "difficulty": "medium"},
  {"question": "How do you find the cause of a memory leak in production?", "category": "debugging", "difficulty": "hard"},
  {"question": "What trade-offs do you weigh when choosing a database?", "category": "architecture", "difficulty": "medium"}
]"#;

const CANNED_FEEDBACK: &str = r#"{
  "overall_score": 7,
  "summary": "Clear answers with good structure; add more measurable outcomes.",
  "strengths": ["Structured explanations", "Relevant examples"],
  "improvements": ["Quantify impact", "Discuss alternatives considered"],
  "question_feedback": []
}"#;

const CANNED_REPLY: &str = "Thanks. Can you walk me through how you would test that approach?";

/// Mock text provider.
///
/// Scripted responses are returned first in FIFO order; once the script is
/// empty each purpose gets a canned answer.
pub struct MockTextProvider {
    enabled: bool,
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<PromptRequest>>,
}

impl MockTextProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            script: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue raw model output for the next call.
    pub fn push_response(&self, text: impl Into<String>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Ok(text.into()));
        }
    }

    /// Queue a failure for the next call.
    pub fn push_error(&self, err: ProviderError) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Err(err));
        }
    }

    /// Requests received so far.
    pub fn prompts(&self) -> Vec<PromptRequest> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    fn canned(purpose: PromptPurpose) -> &'static str {
        match purpose {
            PromptPurpose::Questions => CANNED_QUESTIONS,
            PromptPurpose::Feedback => CANNED_FEEDBACK,
            PromptPurpose::InterviewerReply => CANNED_REPLY,
        }
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        MOCK_MODEL
    }

    async fn generate(&self, request: &PromptRequest) -> Result<ProviderResponse, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ));
        }

        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.clone());
        }

        let scripted = self.script.lock().ok().and_then(|mut s| s.pop_front());
        let text = match scripted {
            Some(result) => result?,
            None => Self::canned(request.purpose).to_string(),
        };

        Ok(ProviderResponse {
            input_tokens: request.prompt.len() as i32 / 4,
            output_tokens: text.len() as i32 / 4,
            text: Some(text).filter(|t| !t.is_empty()),
            finish_reason: FinishReason::Complete,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ))
        }
    }
}
