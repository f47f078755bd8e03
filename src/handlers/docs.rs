// src/handlers/docs.rs

use axum::Json;
use utoipa::OpenApi;

use crate::handlers::{health, judge, questions, quiz};

#[derive(OpenApi)]
#[openapi(
    info(title = "Interview Prep API", description = "Quiz sessions, question library and mock code judge"),
    paths(
        health::health_check,
        questions::list_questions,
        questions::list_companies,
        questions::list_topics,
        quiz::create_session,
        quiz::get_session,
        quiz::start_session,
        quiz::select_answer,
        quiz::toggle_flag,
        quiz::navigate,
        quiz::previous_question,
        quiz::next_question,
        quiz::submit,
        quiz::cancel_submit,
        quiz::confirm_submit,
        quiz::get_result,
        quiz::retry,
        quiz::delete_session,
        judge::execute,
    ),
    tags(
        (name = "quiz", description = "Timed multiple-choice sessions"),
        (name = "judge", description = "Simulated code execution"),
        (name = "questions", description = "Question library"),
    )
)]
pub struct ApiDoc;

/// GET /api/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
