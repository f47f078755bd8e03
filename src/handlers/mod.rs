// src/handlers/mod.rs

pub mod docs;
pub mod health;
pub mod judge;
pub mod questions;
pub mod quiz;
