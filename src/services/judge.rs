// src/services/judge.rs

use std::sync::Arc;

use crate::{
    config::{HIDDEN_PLACEHOLDER, RUN_MODE_CASE_LIMIT},
    models::execution::{
        ExecutionResult, ExecuteResponse, Language, RunMode, TestCase, Verdict,
    },
    services::{classifier::TIME_LIMIT_MESSAGE, execution_backend::ExecutionBackend},
};

/// A request that already passed validation.
#[derive(Debug, Clone)]
pub struct Submission {
    pub code: String,
    pub language: Language,
    pub mode: RunMode,
    pub test_cases: Vec<TestCase>,
}

/// Applies the run/submit policy on top of an `ExecutionBackend`.
///
/// Cases are executed strictly in order, one at a time.
#[derive(Clone)]
pub struct Judge {
    backend: Arc<dyn ExecutionBackend>,
}

impl Judge {
    pub fn new(backend: Arc<dyn ExecutionBackend>) -> Self {
        Self { backend }
    }

    pub async fn judge(&self, submission: &Submission) -> ExecuteResponse {
        match submission.mode {
            RunMode::Run => self.run_samples(submission).await,
            RunMode::Submit => self.submit(submission).await,
        }
    }

    /// Visible cases only, at most `RUN_MODE_CASE_LIMIT` of them, no verdict.
    async fn run_samples(&self, submission: &Submission) -> ExecuteResponse {
        let mut results = Vec::new();
        for case in submission
            .test_cases
            .iter()
            .filter(|c| !c.is_hidden)
            .take(RUN_MODE_CASE_LIMIT)
        {
            let result = self
                .backend
                .execute(&submission.code, submission.language, case)
                .await;
            results.push(result);
        }

        let total_count = results.len();
        build_response(None, results, total_count)
    }

    /// Every case in order, stopping at the first failure.
    ///
    /// A failing hidden case has its input and expected output redacted.
    /// `total_count` stays the full case count even when execution stops early.
    async fn submit(&self, submission: &Submission) -> ExecuteResponse {
        let mut results = Vec::new();
        for case in &submission.test_cases {
            let mut result = self
                .backend
                .execute(&submission.code, submission.language, case)
                .await;

            let failed = !result.passed;
            if failed && result.is_hidden {
                redact(&mut result);
            }
            results.push(result);

            if failed {
                break;
            }
        }

        let verdict = aggregate_verdict(&results);
        build_response(Some(verdict), results, submission.test_cases.len())
    }
}

fn redact(result: &mut ExecutionResult) {
    result.input = HIDDEN_PLACEHOLDER.to_string();
    result.expected_output = HIDDEN_PLACEHOLDER.to_string();
}

/// Accepted if everything passed, otherwise decided by the first failing case.
pub fn aggregate_verdict(results: &[ExecutionResult]) -> Verdict {
    let Some(failure) = results.iter().find(|r| !r.passed) else {
        return Verdict::Accepted;
    };

    match failure.error.as_deref() {
        Some(error) if error.contains(TIME_LIMIT_MESSAGE) => Verdict::TimeLimitExceeded,
        Some(error) if !error.is_empty() => Verdict::RuntimeError,
        _ => Verdict::WrongAnswer,
    }
}

fn build_response(
    verdict: Option<Verdict>,
    results: Vec<ExecutionResult>,
    total_count: usize,
) -> ExecuteResponse {
    let total_execution_time = results.iter().map(|r| r.execution_time_ms).sum();
    let passed_count = results.iter().filter(|r| r.passed).count();

    ExecuteResponse {
        verdict,
        results,
        total_execution_time,
        passed_count,
        total_count,
    }
}
