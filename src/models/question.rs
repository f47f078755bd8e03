// src/models/question.rs

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(format!("Unknown difficulty: {}", s)),
        }
    }
}

/// A multiple-choice question from the aptitude / company-wise pool.
/// Immutable once the bank is loaded.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[validate(length(min = 1, max = 64))]
    pub id: String,

    #[validate(length(min = 1, max = 2000))]
    pub prompt: String,

    /// Exactly four answer options.
    #[validate(length(equal = 4))]
    pub options: Vec<String>,

    /// Zero-based index into `options`.
    pub correct_answer_index: usize,

    pub difficulty: Difficulty,

    #[validate(length(min = 1, max = 100))]
    pub topic: String,

    /// Free-form tag such as "Product" or "Service".
    #[validate(length(min = 1, max = 100))]
    pub company_type: String,

    #[serde(default)]
    pub companies: Vec<String>,

    #[validate(length(max = 4000))]
    #[serde(default)]
    pub explanation: String,
}

impl Question {
    pub fn is_asked_by_any(&self, companies: &std::collections::BTreeSet<String>) -> bool {
        self.companies.iter().any(|c| companies.contains(c))
    }
}

/// Question as shown while a quiz is running (no answer key, no explanation).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub difficulty: Difficulty,
    pub topic: String,
    pub company_type: String,
    pub companies: Vec<String>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id.clone(),
            prompt: q.prompt.clone(),
            options: q.options.clone(),
            difficulty: q.difficulty,
            topic: q.topic.clone(),
            company_type: q.company_type.clone(),
            companies: q.companies.clone(),
        }
    }
}

/// Query parameters for browsing the question library.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QuestionListParams {
    pub company: Option<String>,
    pub topic: Option<String>,
    pub difficulty: Option<String>,
}
