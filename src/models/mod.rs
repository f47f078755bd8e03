// src/models/mod.rs

pub mod execution;
pub mod question;
pub mod quiz;
