// src/services/question_bank.rs

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use validator::Validate;

use crate::models::question::{Difficulty, Question};

const BUNDLED_QUESTIONS: &str = include_str!("../../data/questions.json");

#[derive(Debug)]
pub enum QuestionBankError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl fmt::Display for QuestionBankError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionBankError::Io(msg) => write!(f, "failed to read question bank: {}", msg),
            QuestionBankError::Parse(msg) => write!(f, "failed to parse question bank: {}", msg),
            QuestionBankError::Invalid(msg) => write!(f, "invalid question bank: {}", msg),
        }
    }
}

impl std::error::Error for QuestionBankError {}

/// The read-only question pool every quiz session draws from.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Validates every question and rejects the pool as a whole on the first bad entry.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionBankError> {
        if questions.is_empty() {
            return Err(QuestionBankError::Invalid("question pool is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for q in &questions {
            q.validate()
                .map_err(|e| QuestionBankError::Invalid(format!("question '{}': {}", q.id, e)))?;

            if q.correct_answer_index >= q.options.len() {
                return Err(QuestionBankError::Invalid(format!(
                    "question '{}': correct answer index {} out of range",
                    q.id, q.correct_answer_index
                )));
            }

            if !seen.insert(q.id.as_str()) {
                return Err(QuestionBankError::Invalid(format!(
                    "duplicate question id '{}'",
                    q.id
                )));
            }
        }

        Ok(Self { questions })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, QuestionBankError> {
        let questions: Vec<Question> =
            serde_json::from_str(raw).map_err(|e| QuestionBankError::Parse(e.to_string()))?;
        Self::new(questions)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, QuestionBankError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| QuestionBankError::Io(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// The dataset compiled into the binary.
    pub fn bundled() -> Result<Self, QuestionBankError> {
        Self::from_json_str(BUNDLED_QUESTIONS)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Questions asked by any of `companies`.
    ///
    /// An empty filter, or a filter that matches nothing, yields the whole pool so a
    /// quiz never starts with zero questions.
    pub fn filter_by_companies(&self, companies: &BTreeSet<String>) -> Vec<&Question> {
        if companies.is_empty() {
            return self.questions.iter().collect();
        }

        let matched: Vec<&Question> = self
            .questions
            .iter()
            .filter(|q| q.is_asked_by_any(companies))
            .collect();

        if matched.is_empty() {
            tracing::debug!(?companies, "Company filter matched nothing, using full pool");
            return self.questions.iter().collect();
        }

        matched
    }

    /// Library browsing: every given criterion must match. Unlike the quiz filter there is no fallback.
    pub fn search(
        &self,
        company: Option<&str>,
        topic: Option<&str>,
        difficulty: Option<Difficulty>,
    ) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| company.is_none_or(|c| q.companies.iter().any(|qc| qc.eq_ignore_ascii_case(c))))
            .filter(|q| topic.is_none_or(|t| q.topic.eq_ignore_ascii_case(t)))
            .filter(|q| difficulty.is_none_or(|d| q.difficulty == d))
            .collect()
    }

    pub fn companies(&self) -> Vec<String> {
        let set: BTreeSet<&String> = self.questions.iter().flat_map(|q| &q.companies).collect();
        set.into_iter().cloned().collect()
    }

    pub fn topics(&self) -> Vec<String> {
        let set: BTreeSet<&String> = self.questions.iter().map(|q| &q.topic).collect();
        set.into_iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, companies: &[&str]) -> Question {
        Question {
            id: id.to_string(),
            prompt: format!("Prompt {}", id),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_answer_index: 0,
            difficulty: Difficulty::Easy,
            topic: "Arrays".to_string(),
            company_type: "Product".to_string(),
            companies: companies.iter().map(|c| c.to_string()).collect(),
            explanation: String::new(),
        }
    }

    #[test]
    fn test_bundled_bank_is_valid() {
        let bank = QuestionBank::bundled().expect("bundled dataset should load");
        assert!(bank.len() >= 15);
        assert!(!bank.companies().is_empty());
    }

    #[test]
    fn test_rejects_out_of_range_answer() {
        let mut q = question("q1", &["Google"]);
        q.correct_answer_index = 4;
        assert!(matches!(
            QuestionBank::new(vec![q]),
            Err(QuestionBankError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_option_count() {
        let mut q = question("q1", &["Google"]);
        q.options.pop();
        assert!(QuestionBank::new(vec![q]).is_err());
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let bank = QuestionBank::new(vec![question("q1", &[]), question("q1", &[])]);
        assert!(bank.is_err());
    }

    #[test]
    fn test_filter_keeps_matching_questions() {
        let bank = QuestionBank::new(vec![
            question("q1", &["Google"]),
            question("q2", &["Amazon"]),
            question("q3", &["Google", "Meta"]),
        ])
        .unwrap();

        let filter = BTreeSet::from(["Meta".to_string(), "Google".to_string()]);
        let ids: Vec<&str> = bank
            .filter_by_companies(&filter)
            .iter()
            .map(|q| q.id.as_str())
            .collect();
        assert_eq!(ids, vec!["q1", "q3"]);
    }

    #[test]
    fn test_filter_falls_back_to_full_pool() {
        let bank = QuestionBank::new(vec![question("q1", &["Google"]), question("q2", &[])]).unwrap();

        let filter = BTreeSet::from(["Nobody".to_string()]);
        assert_eq!(bank.filter_by_companies(&filter).len(), 2);
    }

    #[test]
    fn test_search_has_no_fallback() {
        let bank = QuestionBank::new(vec![question("q1", &["Google"])]).unwrap();
        assert!(bank.search(Some("Nobody"), None, None).is_empty());
        assert_eq!(bank.search(Some("google"), Some("arrays"), Some(Difficulty::Easy)).len(), 1);
    }
}
