// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{
    error::handle_panic,
    handlers::{docs, health, judge, questions, quiz},
    state::AppState,
};

/// Builds the CORS layer from the configured origins.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Skipping CORS origin {:?}: {}", o, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

/// Assembles the main application router.
///
/// * Merges all sub-routers (questions, quiz, judge).
/// * Applies global middleware (Trace, CORS, panic -> 500).
/// * Injects global state.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let question_routes = Router::new()
        .route("/", get(questions::list_questions))
        .route("/companies", get(questions::list_companies))
        .route("/topics", get(questions::list_topics));

    let quiz_routes = Router::new()
        .route("/sessions", post(quiz::create_session))
        .route(
            "/sessions/{id}",
            get(quiz::get_session).delete(quiz::delete_session),
        )
        .route("/sessions/{id}/start", post(quiz::start_session))
        .route("/sessions/{id}/answer", post(quiz::select_answer))
        .route("/sessions/{id}/flag", post(quiz::toggle_flag))
        .route("/sessions/{id}/navigate", post(quiz::navigate))
        .route("/sessions/{id}/previous", post(quiz::previous_question))
        .route("/sessions/{id}/next", post(quiz::next_question))
        .route("/sessions/{id}/submit", post(quiz::submit))
        .route("/sessions/{id}/submit/cancel", post(quiz::cancel_submit))
        .route("/sessions/{id}/submit/confirm", post(quiz::confirm_submit))
        .route("/sessions/{id}/result", get(quiz::get_result))
        .route("/sessions/{id}/retry", post(quiz::retry));

    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/openapi.json", get(docs::openapi_json))
        .route("/api/execute", post(judge::execute))
        .nest("/api/questions", question_routes)
        .nest("/api/quiz", quiz_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CatchPanicLayer::custom(handle_panic)),
        )
        .with_state(state)
}
