// src/handlers/judge.rs

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use validator::Validate;

use crate::{
    error::AppError,
    models::execution::{ExecuteRequest, ExecuteResponse, Language},
    services::judge::{Judge, Submission},
};

/// Checks the request and turns it into a `Submission`.
///
/// Missing `code`, `language` or `testCases`, and unknown languages, are the
/// only rejections. Program failures are reported inside a 200 response.
fn into_submission(req: ExecuteRequest) -> Result<Submission, AppError> {
    req.validate()?;

    let (Some(code), Some(language), Some(test_cases)) = (req.code, req.language, req.test_cases)
    else {
        return Err(AppError::BadRequest(
            "Missing required fields: code, language, testCases".to_string(),
        ));
    };

    let language: Language = language.parse().map_err(AppError::BadRequest)?;

    Ok(Submission {
        code,
        language,
        mode: req.mode,
        test_cases,
    })
}

/// POST /api/execute - Judge code against test cases.
///
/// * `run`: up to 3 visible cases, no verdict.
/// * `submit`: every case in order, stops at the first failure, failing hidden cases are redacted.
#[utoipa::path(
    post,
    path = "/api/execute",
    tag = "judge",
    request_body = ExecuteRequest,
    responses(
        (status = 200, description = "Judged (program errors are reported per case)", body = ExecuteResponse),
        (status = 400, description = "Missing fields or unsupported language"),
        (status = 500, description = "Unexpected judge failure")
    )
)]
pub async fn execute(
    State(judge): State<Judge>,
    payload: Result<Json<ExecuteRequest>, JsonRejection>,
) -> Result<Json<ExecuteResponse>, AppError> {
    let Json(req) = payload?;
    let problem_id = req.problem_id.clone().unwrap_or_default();
    let submission = into_submission(req)?;

    let response = judge.judge(&submission).await;

    tracing::info!(
        problem_id = %problem_id,
        language = %submission.language,
        mode = ?submission.mode,
        verdict = ?response.verdict,
        passed = response.passed_count,
        total = response.total_count,
        "Code judged"
    );

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::execution::{RunMode, TestCase};

    fn request(code: Option<&str>, language: Option<&str>, cases: Option<Vec<TestCase>>) -> ExecuteRequest {
        ExecuteRequest {
            code: code.map(str::to_string),
            language: language.map(str::to_string),
            mode: RunMode::Submit,
            test_cases: cases,
            problem_id: None,
        }
    }

    fn one_case() -> Vec<TestCase> {
        vec![TestCase {
            input: "2+2".to_string(),
            expected_output: "4".to_string(),
            is_hidden: false,
        }]
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        assert!(matches!(
            into_submission(request(None, Some("python"), Some(one_case()))),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            into_submission(request(Some("print(4)"), None, Some(one_case()))),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            into_submission(request(Some("print(4)"), Some("python"), None)),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            into_submission(request(Some("print(4)"), Some("python"), Some(vec![]))),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_unsupported_language() {
        let err = into_submission(request(Some("puts 4"), Some("ruby"), Some(one_case()))).unwrap_err();
        match err {
            AppError::BadRequest(msg) => assert_eq!(msg, "Unsupported language: ruby"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_valid_request() {
        let submission =
            into_submission(request(Some("print(4)"), Some("Python"), Some(one_case()))).unwrap();
        assert_eq!(submission.language, Language::Python);
        assert_eq!(submission.mode, RunMode::Submit);
        assert_eq!(submission.test_cases.len(), 1);
    }
}
