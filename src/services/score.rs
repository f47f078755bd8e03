// src/services/score.rs

use std::collections::BTreeMap;

use crate::models::{
    question::{Difficulty, Question},
    quiz::{CategoryStats, ScoreSummary},
};

fn tally(stats: &mut CategoryStats, answered: bool, correct: bool) {
    stats.total += 1;
    if answered {
        stats.attempted += 1;
    }
    if correct {
        stats.correct += 1;
    }
}

/// Scores a finished session.
///
/// Pure over `(questions, answers)`; both slices are indexed identically.
/// Every difficulty level is always present in `by_difficulty`, topics and
/// company types only when they occur in the session.
pub fn summarize(questions: &[Question], answers: &[Option<usize>]) -> ScoreSummary {
    let mut correct = 0;
    let mut incorrect = 0;
    let mut unanswered = 0;

    let mut by_difficulty: BTreeMap<Difficulty, CategoryStats> = Difficulty::ALL
        .iter()
        .map(|d| (*d, CategoryStats::default()))
        .collect();
    let mut by_topic: BTreeMap<String, CategoryStats> = BTreeMap::new();
    let mut by_company_type: BTreeMap<String, CategoryStats> = BTreeMap::new();

    for (question, answer) in questions.iter().zip(answers.iter()) {
        let is_correct = *answer == Some(question.correct_answer_index);
        match answer {
            None => unanswered += 1,
            Some(_) if is_correct => correct += 1,
            Some(_) => incorrect += 1,
        }

        let answered = answer.is_some();
        tally(
            by_difficulty.entry(question.difficulty).or_default(),
            answered,
            is_correct,
        );
        tally(
            by_topic.entry(question.topic.clone()).or_default(),
            answered,
            is_correct,
        );
        tally(
            by_company_type
                .entry(question.company_type.clone())
                .or_default(),
            answered,
            is_correct,
        );
    }

    let total = questions.len();

    ScoreSummary {
        total,
        correct,
        incorrect,
        unanswered,
        percentage: percentage(correct, total),
        by_difficulty,
        by_topic,
        by_company_type,
    }
}

/// `round(correct / total * 100)`, half away from zero.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(difficulty: Difficulty, topic: &str, company_type: &str) -> Question {
        Question {
            id: format!("{}-{}", topic, company_type),
            prompt: "Prompt".to_string(),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_answer_index: 1,
            difficulty,
            topic: topic.to_string(),
            company_type: company_type.to_string(),
            companies: vec![],
            explanation: String::new(),
        }
    }

    #[test]
    fn test_summary_counts() {
        let questions = vec![
            question(Difficulty::Easy, "Arrays", "Product"),
            question(Difficulty::Easy, "DBMS", "Service"),
            question(Difficulty::Hard, "Arrays", "Product"),
        ];
        let answers = vec![Some(1), Some(0), None];

        let summary = summarize(&questions, &answers);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.incorrect, 1);
        assert_eq!(summary.unanswered, 1);
        assert_eq!(summary.percentage, 33);

        let easy = &summary.by_difficulty[&Difficulty::Easy];
        assert_eq!((easy.total, easy.attempted, easy.correct), (2, 2, 1));
        let medium = &summary.by_difficulty[&Difficulty::Medium];
        assert_eq!((medium.total, medium.attempted, medium.correct), (0, 0, 0));

        let arrays = &summary.by_topic["Arrays"];
        assert_eq!((arrays.total, arrays.attempted, arrays.correct), (2, 1, 1));
        assert_eq!(summary.by_company_type["Service"].correct, 0);
    }

    #[test]
    fn test_summary_is_deterministic() {
        let questions = vec![
            question(Difficulty::Medium, "OS", "Product"),
            question(Difficulty::Hard, "Networks", "Service"),
        ];
        let answers = vec![Some(1), Some(1)];

        let first = serde_json::to_string(&summarize(&questions, &answers)).unwrap();
        let second = serde_json::to_string(&summarize(&questions, &answers)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(15, 15), 100);
        assert_eq!(percentage(0, 0), 0);
    }
}
