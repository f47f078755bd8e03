// src/state.rs

use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;

use crate::{
    config::Config,
    services::{
        execution_backend::HeuristicBackend,
        judge::Judge,
        question_bank::QuestionBank,
        quiz_session::QuizSettings,
        session_registry::SessionRegistry,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub question_bank: Arc<QuestionBank>,
    pub sessions: SessionRegistry,
    pub judge: Judge,
}

impl AppState {
    /// Wires the question bank and the heuristic judge from configuration.
    pub fn new(config: Config, question_bank: QuestionBank) -> Self {
        let question_bank = Arc::new(question_bank);
        let sessions = SessionRegistry::new(question_bank.clone(), QuizSettings::from(&config));
        let backend = HeuristicBackend::new(
            Duration::from_millis(config.judge_case_delay_ms),
            config.judge_accept_probability,
        );

        Self {
            config,
            question_bank,
            sessions,
            judge: Judge::new(Arc::new(backend)),
        }
    }
}

impl FromRef<AppState> for Arc<QuestionBank> {
    fn from_ref(state: &AppState) -> Self {
        state.question_bank.clone()
    }
}

impl FromRef<AppState> for SessionRegistry {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for Judge {
    fn from_ref(state: &AppState) -> Self {
        state.judge.clone()
    }
}
