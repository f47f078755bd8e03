// src/services/mod.rs

pub mod classifier;
pub mod execution_backend;
pub mod judge;
pub mod question_bank;
pub mod quiz_session;
pub mod score;
pub mod session_registry;
