// src/handlers/questions.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::question::{Difficulty, PublicQuestion, QuestionListParams},
    services::question_bank::QuestionBank,
};

/// Browses the question library.
///
/// All given filters must match (company and topic are case-insensitive).
/// Answer keys are never included.
#[utoipa::path(
    get,
    path = "/api/questions",
    tag = "questions",
    params(QuestionListParams),
    responses(
        (status = 200, description = "Matching questions", body = [PublicQuestion]),
        (status = 400, description = "Unknown difficulty")
    )
)]
pub async fn list_questions(
    State(bank): State<Arc<QuestionBank>>,
    Query(params): Query<QuestionListParams>,
) -> Result<impl IntoResponse, AppError> {
    let difficulty = params
        .difficulty
        .as_deref()
        .map(str::parse::<Difficulty>)
        .transpose()
        .map_err(AppError::BadRequest)?;

    let questions: Vec<PublicQuestion> = bank
        .search(params.company.as_deref(), params.topic.as_deref(), difficulty)
        .into_iter()
        .map(PublicQuestion::from)
        .collect();

    Ok(Json(questions))
}

/// Distinct company names, for the quiz filter picker.
#[utoipa::path(get, path = "/api/questions/companies", tag = "questions", responses((status = 200, body = [String])))]
pub async fn list_companies(State(bank): State<Arc<QuestionBank>>) -> impl IntoResponse {
    Json(bank.companies())
}

#[utoipa::path(get, path = "/api/questions/topics", tag = "questions", responses((status = 200, body = [String])))]
pub async fn list_topics(State(bank): State<Arc<QuestionBank>>) -> impl IntoResponse {
    Json(bank.topics())
}
