// src/models/execution.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::config::MAX_SOURCE_CODE_BYTES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Java,
    Cpp,
    Javascript,
}

impl FromStr for Language {
    type Err = String;

    /// Case-insensitive. The error is the client-facing message.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" => Ok(Self::Python),
            "java" => Ok(Self::Java),
            "cpp" => Ok(Self::Cpp),
            "javascript" => Ok(Self::Javascript),
            _ => Err(format!("Unsupported language: {}", s)),
        }
    }
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Java => "java",
            Self::Cpp => "cpp",
            Self::Javascript => "javascript",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `run` is a quick sample check, `submit` is the full judged attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Run,
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
    #[serde(default)]
    pub is_hidden: bool,
}

/// Aggregate classification of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Verdict {
    Accepted,
    #[serde(rename = "Wrong Answer")]
    WrongAnswer,
    #[serde(rename = "Time Limit Exceeded")]
    TimeLimitExceeded,
    #[serde(rename = "Runtime Error")]
    RuntimeError,
}

/// Outcome of one test case. `error` being set implies `passed == false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub input: String,
    pub expected_output: String,
    pub is_hidden: bool,
    pub passed: bool,
    pub actual_output: String,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    /// Result for a program that produced `actual_output`; pass/fail is a trimmed comparison.
    pub fn completed(case: &TestCase, actual_output: String, execution_time_ms: u64) -> Self {
        let passed = actual_output.trim() == case.expected_output.trim();
        Self {
            input: case.input.clone(),
            expected_output: case.expected_output.clone(),
            is_hidden: case.is_hidden,
            passed,
            actual_output,
            execution_time_ms,
            error: None,
        }
    }

    /// Result for a program that crashed, failed to compile or timed out.
    pub fn errored(case: &TestCase, error: impl Into<String>, execution_time_ms: u64) -> Self {
        Self {
            input: case.input.clone(),
            expected_output: case.expected_output.clone(),
            is_hidden: case.is_hidden,
            passed: false,
            actual_output: String::new(),
            execution_time_ms,
            error: Some(error.into()),
        }
    }
}

/// Body of `POST /api/execute`.
/// Required fields are optional here so that a missing field is a 400 with a readable message.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    #[validate(
        required(message = "Missing required field: code"),
        custom(function = validate_source_size)
    )]
    pub code: Option<String>,

    #[validate(required(message = "Missing required field: language"))]
    pub language: Option<String>,

    #[serde(default)]
    pub mode: RunMode,

    #[validate(
        required(message = "Missing required field: testCases"),
        length(min = 1, message = "testCases cannot be empty")
    )]
    pub test_cases: Option<Vec<TestCase>>,

    #[serde(default)]
    pub problem_id: Option<String>,
}

/// Source size is capped in bytes, not characters.
fn validate_source_size(code: &str) -> Result<(), validator::ValidationError> {
    if code.is_empty() || code.len() > MAX_SOURCE_CODE_BYTES {
        return Err(validator::ValidationError::new("code_size")
            .with_message("code must be between 1 byte and 64 KiB".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    /// Only present in submit mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
    pub results: Vec<ExecutionResult>,
    pub total_execution_time: u64,
    pub passed_count: usize,
    pub total_count: usize,
}
