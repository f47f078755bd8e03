// src/models/quiz.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::question::{Difficulty, PublicQuestion};

/// Lifecycle of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Setup,
    InProgress,
    Result,
}

/// How an InProgress session reached the Result phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Submitted,
    TimeUp,
}

/// Attempted/correct tally for one slice of the session (a difficulty, a topic, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryStats {
    pub total: usize,
    pub attempted: usize,
    pub correct: usize,
}

/// Derived once when the session enters the Result phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub unanswered: usize,
    /// `round(correct / total * 100)`, 0 for an empty session.
    pub percentage: u32,
    pub by_difficulty: BTreeMap<Difficulty, CategoryStats>,
    pub by_topic: BTreeMap<String, CategoryStats>,
    pub by_company_type: BTreeMap<String, CategoryStats>,
}

/// DTO for creating or restarting a session.
/// `companies` narrows the pool; omitted keeps the current filter.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct StartQuizRequest {
    #[validate(length(max = 50), custom(function = validate_company_names))]
    pub companies: Option<Vec<String>>,
}

fn validate_company_names(companies: &[String]) -> Result<(), validator::ValidationError> {
    for name in companies {
        if name.trim().is_empty() {
            return Err(validator::ValidationError::new("company_name_cannot_be_empty"));
        }
        if name.chars().count() > 100 {
            return Err(validator::ValidationError::new("company_name_too_long"));
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub option_index: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NavigateRequest {
    pub index: usize,
}

/// Snapshot of a session for the quiz screen.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Uuid,
    pub phase: Phase,
    pub attempt: u32,
    pub companies: Vec<String>,
    pub total_questions: usize,
    pub current_index: usize,
    pub current_question: Option<PublicQuestion>,
    pub answers: Vec<Option<usize>>,
    pub flagged: Vec<usize>,
    pub answered_count: usize,
    pub remaining_secs: u32,
    pub running: bool,
    pub awaiting_confirmation: bool,
    pub started_at: Option<DateTime<Utc>>,
}

/// Returned by a manual submit; the session only finishes after confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitConfirmation {
    pub answered: usize,
    pub total: usize,
    pub flagged: usize,
    pub unanswered: usize,
    pub warning: Option<String>,
}

/// One line of the post-quiz review.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionReview {
    pub id: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub selected_index: Option<usize>,
    pub correct_answer_index: usize,
    pub is_correct: bool,
    pub flagged: bool,
    pub explanation: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    pub session_id: Uuid,
    pub ended_by: EndReason,
    pub time_taken_secs: u32,
    pub finished_at: Option<DateTime<Utc>>,
    pub summary: ScoreSummary,
    pub review: Vec<QuestionReview>,
}
