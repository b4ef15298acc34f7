//! Prompt construction and tolerant parsing of model output.
//!
//! Models are asked for JSON, but replies still arrive wrapped in Markdown
//! fences, as bare arrays, wrapped objects or plain numbered text. The
//! parsers here accept all of those.

use crate::models::{
    AnswerRecord, ExperienceLevel, Interview, InterviewSession, InterviewType, Message,
    QuestionFeedback,
};
use serde_json::Value;

pub const QUESTION_SYSTEM_PROMPT: &str = "You are an experienced hiring manager preparing \
realistic interview questions. Reply only with JSON.";

pub const FEEDBACK_SYSTEM_PROMPT: &str = "You are an interview coach. Assess the candidate's \
answers honestly and constructively. Reply only with JSON.";

pub const INTERVIEWER_SYSTEM_PROMPT: &str = "You are the interviewer in a live practice \
interview. Ask one concise follow-up or next question at a time. Do not answer for the \
candidate.";

const DEFAULT_CATEGORY: &str = "general";
const DEFAULT_DIFFICULTY: &str = "medium";
const MAX_SCORE: f64 = 10.0;

/// Inputs for a question-generation prompt.
#[derive(Debug, Clone, Copy)]
pub struct QuestionBrief<'a> {
    pub role: &'a str,
    pub company: Option<&'a str>,
    pub experience_level: ExperienceLevel,
    pub interview_type: InterviewType,
    pub tech_stack: &'a [String],
    pub job_description: Option<&'a str>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionDraft {
    pub text: String,
    pub category: String,
    pub difficulty: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackReport {
    pub overall_score: Option<i32>,
    pub summary: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub question_feedback: Vec<QuestionFeedback>,
}

pub fn question_prompt(brief: &QuestionBrief<'_>) -> String {
    let mut prompt = format!(
        "Write {} {} interview questions for a {} {} candidate",
        brief.count, brief.interview_type, brief.experience_level, brief.role
    );
    if let Some(company) = brief.company {
        prompt.push_str(&format!(" interviewing at {}", company));
    }
    prompt.push_str(".\n");

    if !brief.tech_stack.is_empty() {
        prompt.push_str(&format!("Tech stack: {}.\n", brief.tech_stack.join(", ")));
    }
    if let Some(description) = brief.job_description {
        prompt.push_str(&format!("Job description:\n{}\n", description));
    }

    prompt.push_str(
        "\nReturn a JSON array of objects with the fields \"question\", \"category\" and \
         \"difficulty\" (easy, medium or hard).",
    );
    prompt
}

pub fn feedback_prompt(interview: &Interview, answers: &[AnswerRecord]) -> String {
    let mut prompt = format!(
        "The candidate practised a {} interview for a {} {} role.\n\n",
        interview.interview_type, interview.experience_level, interview.role
    );

    for answer in answers {
        prompt.push_str(&format!(
            "Question [{}]: {}\nAnswer: {}\n\n",
            answer.question_id, answer.question, answer.answer
        ));
    }

    prompt.push_str(
        "Return a JSON object with \"overall_score\" (integer 0-10), \"summary\", \
         \"strengths\" (array of strings), \"improvements\" (array of strings) and \
         \"question_feedback\" (array of objects with \"question_id\", \"score\" and \
         \"comment\"). Use the question ids given in brackets.",
    );
    prompt
}

pub fn interviewer_prompt(session: &InterviewSession, history: &[Message]) -> String {
    let mut prompt = format!("Interview: {} for the role of {}", session.title, session.role);
    if let Some(company) = &session.company {
        prompt.push_str(&format!(" at {}", company));
    }
    prompt.push_str(".\n\nConversation so far:\n");

    for message in history {
        let speaker = message
            .sender_role
            .map(|r| r.to_string())
            .unwrap_or_else(|| message.sender_id.clone());
        prompt.push_str(&format!("{}: {}\n", speaker, message.content));
    }

    prompt.push_str("\nReply as the interviewer.");
    prompt
}

/// Remove a surrounding Markdown code fence, with or without a language tag.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Parse the cleaned text as JSON, falling back to the outermost JSON
/// array or object embedded in surrounding prose.
fn parse_json_loose(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }
    [('[', ']'), ('{', '}')].iter().find_map(|(open, close)| {
        let start = text.find(*open)?;
        let end = text.rfind(*close)?;
        if end <= start {
            return None;
        }
        serde_json::from_str(&text[start..=end]).ok()
    })
}

fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn question_from_value(value: &Value) -> Option<QuestionDraft> {
    match value {
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| QuestionDraft {
                text: text.to_string(),
                category: DEFAULT_CATEGORY.to_string(),
                difficulty: DEFAULT_DIFFICULTY.to_string(),
            })
        }
        Value::Object(_) => Some(QuestionDraft {
            text: string_field(value, &["question", "text"])?,
            category: string_field(value, &["category"])
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            difficulty: string_field(value, &["difficulty"])
                .map(|d| d.to_lowercase())
                .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string()),
        }),
        _ => None,
    }
}

/// Strip a list marker (`1.`, `2)`, `-`, `*`, `•`). Returns the remaining
/// text and whether a marker was present.
fn strip_list_marker(line: &str) -> (&str, bool) {
    for bullet in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(bullet) {
            return (rest.trim(), true);
        }
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return (rest.trim(), true);
        }
    }

    (line, false)
}

fn questions_from_lines(text: &str) -> Vec<QuestionDraft> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let (body, listed) = strip_list_marker(line);
            let body = body.trim_matches('"').trim();
            if body.is_empty() || !(listed || body.ends_with('?')) {
                return None;
            }
            Some(QuestionDraft {
                text: body.to_string(),
                category: DEFAULT_CATEGORY.to_string(),
                difficulty: DEFAULT_DIFFICULTY.to_string(),
            })
        })
        .collect()
}

/// Extract up to `limit` questions from model output.
pub fn parse_questions(raw: &str, limit: usize) -> Vec<QuestionDraft> {
    let text = strip_code_fences(raw);

    let from_json = parse_json_loose(text).and_then(|value| {
        let items = match &value {
            Value::Array(items) => items.clone(),
            Value::Object(_) => value.get("questions")?.as_array()?.clone(),
            _ => return None,
        };
        Some(items.iter().filter_map(question_from_value).collect::<Vec<_>>())
    });

    let mut questions = match from_json {
        Some(questions) if !questions.is_empty() => questions,
        _ => questions_from_lines(text),
    };
    questions.truncate(limit);
    questions
}

fn score_from_value(value: Option<&Value>) -> Option<i32> {
    let score = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    score
        .is_finite()
        .then(|| score.round().clamp(0.0, MAX_SCORE) as i32)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn question_feedback_from_value(value: &Value) -> Option<QuestionFeedback> {
    Some(QuestionFeedback {
        question_id: string_field(value, &["question_id", "id"])?,
        score: score_from_value(value.get("score")),
        comment: string_field(value, &["comment", "feedback"]).unwrap_or_default(),
    })
}

/// Interpret model output as a feedback report. Output that is not a JSON
/// object becomes the summary.
pub fn parse_feedback(raw: &str) -> FeedbackReport {
    let text = strip_code_fences(raw);

    match parse_json_loose(text) {
        Some(value @ Value::Object(_)) => FeedbackReport {
            overall_score: score_from_value(
                value.get("overall_score").or_else(|| value.get("score")),
            ),
            summary: string_field(&value, &["summary"]).unwrap_or_default(),
            strengths: string_list(value.get("strengths")),
            improvements: string_list(value.get("improvements")),
            question_feedback: value
                .get("question_feedback")
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(question_feedback_from_value).collect())
                .unwrap_or_default(),
        },
        _ => FeedbackReport {
            summary: text.to_string(),
            ..FeedbackReport::default()
        },
    }
}
