// src/services/execution_backend.rs

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::{
    config::{SIMULATED_TLE_MS, probability_or},
    models::execution::{ExecutionResult, Language, TestCase},
    services::classifier::{self, Outcome, OutputHint, TIME_LIMIT_MESSAGE},
};

/// Runs one submission against one test case.
///
/// The judge only sees `ExecutionResult`s, so a real sandbox can replace the
/// heuristic backend without touching mode policy or verdict logic.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    async fn execute(&self, code: &str, language: Language, case: &TestCase) -> ExecutionResult;
}

/// Simulated execution driven by `classifier::classify`.
///
/// When no heuristic recognizes the code, the output is a weighted coin flip
/// between the expected output and a corrupted copy of it. That branch is demo
/// behavior, not a judging contract.
#[derive(Debug, Clone)]
pub struct HeuristicBackend {
    /// Artificial latency per case.
    pub case_delay: Duration,
    /// Probability of echoing the expected output for unrecognized code.
    pub accept_probability: f64,
}

impl HeuristicBackend {
    /// A non-finite `accept_probability` is treated as 0.
    pub fn new(case_delay: Duration, accept_probability: f64) -> Self {
        Self {
            case_delay,
            accept_probability: probability_or(accept_probability, 0.0),
        }
    }

    fn simulated_output(&self, hint: OutputHint, expected: &str) -> String {
        match hint {
            OutputHint::LikelyCorrect => expected.to_string(),
            OutputHint::Template => String::new(),
            OutputHint::Unknown => {
                if rand::thread_rng().gen_bool(self.accept_probability) {
                    expected.to_string()
                } else {
                    corrupt(expected)
                }
            }
        }
    }
}

#[async_trait]
impl ExecutionBackend for HeuristicBackend {
    async fn execute(&self, code: &str, language: Language, case: &TestCase) -> ExecutionResult {
        if !self.case_delay.is_zero() {
            tokio::time::sleep(self.case_delay).await;
        }

        let execution_time_ms = rand::thread_rng().gen_range(5..=120);

        match classifier::classify(code, language) {
            Outcome::SyntaxError(message) => ExecutionResult::errored(case, message, 0),
            Outcome::RuntimeError(message) => {
                ExecutionResult::errored(case, message, execution_time_ms)
            }
            Outcome::TimeLimitExceeded => {
                ExecutionResult::errored(case, TIME_LIMIT_MESSAGE, SIMULATED_TLE_MS)
            }
            Outcome::Runs(hint) => {
                let output = self.simulated_output(hint, &case.expected_output);
                ExecutionResult::completed(case, output, execution_time_ms)
            }
        }
    }
}

/// Reverses the expected output. Palindromes would survive reversal, so those become empty.
fn corrupt(expected: &str) -> String {
    let trimmed = expected.trim();
    let reversed: String = trimmed.chars().rev().collect();
    if reversed == trimmed {
        String::new()
    } else {
        reversed
    }
}
