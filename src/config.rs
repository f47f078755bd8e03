// src/config.rs

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;
use url::Url;

/// Number of questions materialized into one quiz session.
pub const QUIZ_QUESTION_COUNT: usize = 15;

/// Default countdown for a quiz session, in seconds.
pub const QUIZ_DURATION_SECS: u32 = 20 * 60;

/// `run` mode only checks this many visible test cases.
pub const RUN_MODE_CASE_LIMIT: usize = 3;

/// Replaces input/expected output of a failing hidden case.
pub const HIDDEN_PLACEHOLDER: &str = "[Hidden]";

/// Simulated execution time reported for a time-limit verdict.
pub const SIMULATED_TLE_MS: u64 = 2000;

pub const MAX_SOURCE_CODE_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub rust_log: String,
    pub port: u16,
    /// Question pool on disk. `None` uses the bundled dataset.
    pub question_bank_path: Option<String>,
    pub quiz_question_count: usize,
    pub quiz_duration_secs: u32,
    pub quiz_shuffle: bool,
    pub judge_case_delay_ms: u64,
    /// Weight of the "expected output" branch when no heuristic fires.
    pub judge_accept_probability: f64,
    /// Sessions not in progress are evicted after this long without a request.
    pub session_idle_ttl_secs: u64,
    pub session_sweep_interval_secs: u64,
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rust_log: "info".to_string(),
            port: 3000,
            question_bank_path: None,
            quiz_question_count: QUIZ_QUESTION_COUNT,
            quiz_duration_secs: QUIZ_DURATION_SECS,
            quiz_shuffle: false,
            judge_case_delay_ms: 150,
            judge_accept_probability: 0.7,
            session_idle_ttl_secs: 60 * 60,
            session_sweep_interval_secs: 60,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let defaults = Self::default();

        let rust_log = env::var("RUST_LOG").unwrap_or(defaults.rust_log);

        let question_bank_path = env::var("QUESTION_BANK_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty());

        let judge_accept_probability = probability_or(
            parse_var("JUDGE_ACCEPT_PROBABILITY", defaults.judge_accept_probability),
            defaults.judge_accept_probability,
        );

        let cors_origins = match env::var("CORS_ORIGINS") {
            Ok(raw) => parse_origins(&raw),
            Err(_) => defaults.cors_origins,
        };

        Self {
            rust_log,
            port: parse_var("PORT", defaults.port),
            question_bank_path,
            quiz_question_count: parse_var("QUIZ_QUESTION_COUNT", defaults.quiz_question_count)
                .max(1),
            quiz_duration_secs: parse_var("QUIZ_DURATION_SECS", defaults.quiz_duration_secs)
                .max(1),
            quiz_shuffle: parse_var("QUIZ_SHUFFLE", defaults.quiz_shuffle),
            judge_case_delay_ms: parse_var("JUDGE_CASE_DELAY_MS", defaults.judge_case_delay_ms),
            judge_accept_probability,
            session_idle_ttl_secs: parse_var("SESSION_IDLE_TTL_SECS", defaults.session_idle_ttl_secs),
            session_sweep_interval_secs: parse_var(
                "SESSION_SWEEP_INTERVAL_SECS",
                defaults.session_sweep_interval_secs,
            )
            .max(1),
            cors_origins,
        }
    }
}

/// Reads `key` and parses it, falling back to `default` when unset or invalid.
fn parse_var<T: FromStr + std::fmt::Debug>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value for {}: {:?}, using {:?}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

/// Clamps `value` into `0.0..=1.0`. `f64` parsing accepts "nan" and "inf", so
/// non-finite values fall back to `default`.
pub fn probability_or(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        tracing::warn!("Probability must be finite, got {}, using {}", value, default);
        default
    }
}

/// Splits a comma-separated origin list, dropping entries that are not valid URLs.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| match Url::parse(s) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}: {}", s, e);
                false
            }
        })
        .map(|s| s.trim_end_matches('/').to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_skips_invalid() {
        let origins = parse_origins("http://localhost:5173/, not a url, https://prep.dev");
        assert_eq!(origins, vec!["http://localhost:5173", "https://prep.dev"]);
    }

    #[test]
    fn test_probability_rejects_non_finite() {
        assert_eq!(probability_or("nan".parse().unwrap(), 0.7), 0.7);
        assert_eq!(probability_or(f64::INFINITY, 0.7), 0.7);
        assert_eq!(probability_or(f64::NEG_INFINITY, 0.7), 0.7);
        assert_eq!(probability_or(1.5, 0.7), 1.0);
        assert_eq!(probability_or(-0.2, 0.7), 0.0);
        assert_eq!(probability_or(0.25, 0.7), 0.25);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.quiz_question_count, 15);
        assert!(!config.quiz_shuffle);
    }
}
