// src/handlers/quiz.rs

use std::collections::BTreeSet;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::quiz::{
        AnswerRequest, NavigateRequest, ResultView, SessionView, StartQuizRequest,
        SubmitConfirmation,
    },
    services::session_registry::{SessionRegistry, SharedSession},
};

async fn find_session(registry: &SessionRegistry, id: Uuid) -> Result<SharedSession, AppError> {
    registry
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Quiz session {} not found", id)))
}

fn company_filter(req: StartQuizRequest) -> Option<BTreeSet<String>> {
    req.companies
        .map(|names| names.into_iter().map(|n| n.trim().to_string()).collect())
}

/// Creates a quiz session and starts it.
///
/// * Narrows the pool to the given companies (falls back to the full pool if nothing matches).
/// * Takes the first N questions and starts the countdown.
#[utoipa::path(
    post,
    path = "/api/quiz/sessions",
    tag = "quiz",
    request_body = StartQuizRequest,
    responses(
        (status = 201, description = "Session started", body = SessionView),
        (status = 400, description = "Invalid filter")
    )
)]
pub async fn create_session(
    State(registry): State<SessionRegistry>,
    payload: Result<Json<StartQuizRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let companies = company_filter(req).unwrap_or_default();
    let session = registry.create(companies).await?;
    let view = session.lock().await.view();

    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/api/quiz/sessions/{id}",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Session id")),
    responses((status = 200, body = SessionView), (status = 404, description = "Unknown session"))
)]
pub async fn get_session(
    State(registry): State<SessionRegistry>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = find_session(&registry, id).await?;
    let view = session.lock().await.view();
    Ok(Json(view))
}

/// Starts a session that is back in Setup after a retry, optionally with a new filter.
#[utoipa::path(
    post,
    path = "/api/quiz/sessions/{id}/start",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body = StartQuizRequest,
    responses((status = 200, body = SessionView), (status = 409, description = "Already started"))
)]
pub async fn start_session(
    State(registry): State<SessionRegistry>,
    Path(id): Path<Uuid>,
    payload: Result<Json<StartQuizRequest>, JsonRejection>,
) -> Result<Json<SessionView>, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let session = find_session(&registry, id).await?;
    registry.start(&session, company_filter(req)).await?;

    let view = session.lock().await.view();
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/api/quiz/sessions/{id}/answer",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body = AnswerRequest,
    responses((status = 200, body = SessionView), (status = 400, description = "Option out of range"), (status = 409, description = "Quiz not in progress"))
)]
pub async fn select_answer(
    State(registry): State<SessionRegistry>,
    Path(id): Path<Uuid>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<Json<SessionView>, AppError> {
    let Json(req) = payload?;
    let session = find_session(&registry, id).await?;

    let mut guard = session.lock().await;
    guard.select_answer(req.option_index)?;
    Ok(Json(guard.view()))
}

#[utoipa::path(
    post,
    path = "/api/quiz/sessions/{id}/flag",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Session id")),
    responses((status = 200, body = SessionView), (status = 409, description = "Quiz not in progress"))
)]
pub async fn toggle_flag(
    State(registry): State<SessionRegistry>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = find_session(&registry, id).await?;

    let mut guard = session.lock().await;
    guard.toggle_flag()?;
    Ok(Json(guard.view()))
}

/// Jumps to a question. Out-of-range indices are clamped to the last question.
#[utoipa::path(
    post,
    path = "/api/quiz/sessions/{id}/navigate",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body = NavigateRequest,
    responses((status = 200, body = SessionView), (status = 409, description = "Quiz not in progress"))
)]
pub async fn navigate(
    State(registry): State<SessionRegistry>,
    Path(id): Path<Uuid>,
    payload: Result<Json<NavigateRequest>, JsonRejection>,
) -> Result<Json<SessionView>, AppError> {
    let Json(req) = payload?;
    let session = find_session(&registry, id).await?;

    let mut guard = session.lock().await;
    guard.navigate(req.index)?;
    Ok(Json(guard.view()))
}

#[utoipa::path(
    post,
    path = "/api/quiz/sessions/{id}/previous",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Session id")),
    responses((status = 200, body = SessionView), (status = 409, description = "Quiz not in progress"))
)]
pub async fn previous_question(
    State(registry): State<SessionRegistry>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = find_session(&registry, id).await?;

    let mut guard = session.lock().await;
    guard.previous()?;
    Ok(Json(guard.view()))
}

#[utoipa::path(
    post,
    path = "/api/quiz/sessions/{id}/next",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Session id")),
    responses((status = 200, body = SessionView), (status = 409, description = "Quiz not in progress"))
)]
pub async fn next_question(
    State(registry): State<SessionRegistry>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = find_session(&registry, id).await?;

    let mut guard = session.lock().await;
    guard.next()?;
    Ok(Json(guard.view()))
}

/// Requests submission. Returns the confirmation summary; nothing is scored yet.
#[utoipa::path(
    post,
    path = "/api/quiz/sessions/{id}/submit",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Session id")),
    responses((status = 200, body = SubmitConfirmation), (status = 409, description = "Quiz not in progress"))
)]
pub async fn submit(
    State(registry): State<SessionRegistry>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmitConfirmation>, AppError> {
    let session = find_session(&registry, id).await?;
    let confirmation = session.lock().await.submit()?;
    Ok(Json(confirmation))
}

#[utoipa::path(
    post,
    path = "/api/quiz/sessions/{id}/submit/cancel",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Session id")),
    responses((status = 200, body = SessionView), (status = 409, description = "Quiz not in progress"))
)]
pub async fn cancel_submit(
    State(registry): State<SessionRegistry>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = find_session(&registry, id).await?;

    let mut guard = session.lock().await;
    guard.cancel_submit()?;
    Ok(Json(guard.view()))
}

/// Finalizes a pending submit: stops the clock and scores the session.
#[utoipa::path(
    post,
    path = "/api/quiz/sessions/{id}/submit/confirm",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Session id")),
    responses((status = 200, body = ResultView), (status = 409, description = "No pending submit or quiz already finished"))
)]
pub async fn confirm_submit(
    State(registry): State<SessionRegistry>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResultView>, AppError> {
    let session = find_session(&registry, id).await?;

    let mut guard = session.lock().await;
    let summary = guard.confirm_submit()?;
    tracing::info!(
        session_id = %id,
        correct = summary.correct,
        total = summary.total,
        percentage = summary.percentage,
        "Quiz submitted"
    );

    Ok(Json(guard.result()?))
}

#[utoipa::path(
    get,
    path = "/api/quiz/sessions/{id}/result",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Session id")),
    responses((status = 200, body = ResultView), (status = 409, description = "Quiz not finished"))
)]
pub async fn get_result(
    State(registry): State<SessionRegistry>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResultView>, AppError> {
    let session = find_session(&registry, id).await?;
    let result = session.lock().await.result()?;
    Ok(Json(result))
}

/// Discards the finished attempt and returns the session to Setup. The company filter is kept.
#[utoipa::path(
    post,
    path = "/api/quiz/sessions/{id}/retry",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Session id")),
    responses((status = 200, body = SessionView), (status = 409, description = "Quiz not finished"))
)]
pub async fn retry(
    State(registry): State<SessionRegistry>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = find_session(&registry, id).await?;

    let mut guard = session.lock().await;
    guard.retry()?;
    tracing::info!(session_id = %id, "Quiz reset for retry");
    Ok(Json(guard.view()))
}

/// Leaves the quiz. The session and its countdown are discarded.
#[utoipa::path(
    delete,
    path = "/api/quiz/sessions/{id}",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Session id")),
    responses((status = 204, description = "Session discarded"), (status = 404, description = "Unknown session"))
)]
pub async fn delete_session(
    State(registry): State<SessionRegistry>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !registry.remove(id).await {
        return Err(AppError::NotFound(format!("Quiz session {} not found", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
