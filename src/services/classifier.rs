// src/services/classifier.rs

//! Pattern-matching stand-in for a real compile-and-run sandbox.
//!
//! `classify` looks only at the source text and the language tag. Checks run
//! in a fixed order and the first one that fires decides the outcome:
//! syntax, runtime, time limit, then output hints.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::execution::Language;

/// What the classifier predicts the submitted program would do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    SyntaxError(String),
    RuntimeError(String),
    TimeLimitExceeded,
    /// The program would run to completion; `OutputHint` guesses how well.
    Runs(OutputHint),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputHint {
    /// Recognizable hash-map or brute-force solution shape.
    LikelyCorrect,
    /// Starter template or near-empty code, produces no output.
    Template,
    /// Nothing recognizable.
    Unknown,
}

pub const TIME_LIMIT_MESSAGE: &str = "Time Limit Exceeded";

const MIN_SOLUTION_CHARS: usize = 50;

static DIVISION_BY_ZERO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\s?0(?:[^\d.]|$)").expect("valid regex"));

static LOOP_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:for|while)\b").expect("valid regex"));

static HUGE_BOUND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{8,10}\b").expect("valid regex"));

static MAP_CONSTRUCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:dict|HashMap|unordered_map|Map|defaultdict|Counter)\b|\{\s*\}|\bnew Map\b")
        .expect("valid regex")
});

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?://|#)\s*(?:write your (?:code|solution) here|your code here|todo)")
        .expect("valid regex")
});

pub fn classify(code: &str, language: Language) -> Outcome {
    if let Some(message) = syntax_error(code, language) {
        return Outcome::SyntaxError(message.to_string());
    }
    if let Some(message) = runtime_error(code, language) {
        return Outcome::RuntimeError(message.to_string());
    }
    if exceeds_time_limit(code) {
        return Outcome::TimeLimitExceeded;
    }
    Outcome::Runs(output_hint(code))
}

fn syntax_error(code: &str, language: Language) -> Option<&'static str> {
    let count = |c: char| code.chars().filter(|&ch| ch == c).count();

    if count('\'') % 2 != 0 || count('"') % 2 != 0 {
        return Some(match language {
            Language::Python => "SyntaxError: EOL while scanning string literal",
            Language::Java => "error: unclosed string literal",
            Language::Cpp => "error: missing terminating quote character",
            Language::Javascript => "SyntaxError: Invalid or unexpected token",
        });
    }

    let (open, close) = match language {
        Language::Python => ('(', ')'),
        Language::Java | Language::Cpp | Language::Javascript => ('{', '}'),
    };
    if count(open) != count(close) {
        return Some(match language {
            Language::Python => "SyntaxError: '(' was never closed",
            Language::Java => "error: reached end of file while parsing",
            Language::Cpp => "error: expected '}' at end of input",
            Language::Javascript => "SyntaxError: Unexpected end of input",
        });
    }

    None
}

fn runtime_error(code: &str, language: Language) -> Option<&'static str> {
    if DIVISION_BY_ZERO.is_match(code) {
        return Some(match language {
            Language::Python => "ZeroDivisionError: division by zero",
            Language::Java => "Exception in thread \"main\" java.lang.ArithmeticException: / by zero",
            Language::Cpp => "Floating point exception (core dumped)",
            Language::Javascript => "RangeError: Division by zero",
        });
    }

    // Python indexes from the end with -1, so the pattern is only an error elsewhere.
    if code.contains("[-1]") {
        return match language {
            Language::Python => None,
            Language::Java => Some(
                "Exception in thread \"main\" java.lang.ArrayIndexOutOfBoundsException: Index -1 out of bounds",
            ),
            Language::Cpp => Some("Segmentation fault (core dumped)"),
            Language::Javascript => Some("TypeError: Cannot read properties of undefined"),
        };
    }

    None
}

fn exceeds_time_limit(code: &str) -> bool {
    has_nested_loops(code) && HUGE_BOUND.is_match(code)
}

fn has_nested_loops(code: &str) -> bool {
    LOOP_KEYWORD.find_iter(code).count() >= 2
}

fn output_hint(code: &str) -> OutputHint {
    if code.trim().chars().count() < MIN_SOLUTION_CHARS || PLACEHOLDER.is_match(code) {
        return OutputHint::Template;
    }
    if MAP_CONSTRUCT.is_match(code) && code.contains("target") {
        return OutputHint::LikelyCorrect;
    }
    if has_nested_loops(code) {
        return OutputHint::LikelyCorrect;
    }
    OutputHint::Unknown
}
