// src/services/quiz_session.rs

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::{
    config::Config,
    models::{
        question::{PublicQuestion, Question},
        quiz::{
            EndReason, Phase, QuestionReview, ResultView, ScoreSummary, SessionView,
            SubmitConfirmation,
        },
    },
    services::{question_bank::QuestionBank, score},
};

/// Per-session knobs taken from `Config`.
#[derive(Debug, Clone, Copy)]
pub struct QuizSettings {
    pub question_count: usize,
    pub duration_secs: u32,
    pub shuffle: bool,
}

impl From<&Config> for QuizSettings {
    fn from(config: &Config) -> Self {
        Self {
            question_count: config.quiz_question_count,
            duration_secs: config.quiz_duration_secs,
            shuffle: config.quiz_shuffle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    NotInSetup,
    NotInProgress,
    NotFinished,
    NoPendingSubmit,
    OptionOutOfRange { index: usize, options: usize },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotInSetup => write!(f, "Quiz has already been started"),
            SessionError::NotInProgress => write!(f, "Quiz is not in progress"),
            SessionError::NotFinished => write!(f, "Quiz has not been finished yet"),
            SessionError::NoPendingSubmit => write!(f, "Submit the quiz before confirming"),
            SessionError::OptionOutOfRange { index, options } => write!(
                f,
                "Option index {} is out of range (question has {} options)",
                index, options
            ),
        }
    }
}

impl std::error::Error for SessionError {}

/// Result of one timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running { remaining_secs: u32 },
    /// The countdown hit zero on this tick and the session was finalized.
    TimeUp,
    /// The clock is not running; nothing changed.
    Stopped,
}

/// State machine for one timed multiple-choice assessment.
///
/// Setup -> InProgress -> Result, and back to Setup through `retry`.
/// `answers` always has the same length as `questions`, and `current` always
/// points inside `questions` (it is 0 while the session is empty).
#[derive(Debug)]
pub struct QuizSession {
    id: Uuid,
    bank: Arc<QuestionBank>,
    settings: QuizSettings,
    companies: BTreeSet<String>,
    phase: Phase,
    attempt: u32,
    questions: Vec<Question>,
    answers: Vec<Option<usize>>,
    flagged: BTreeSet<usize>,
    current: usize,
    elapsed_secs: u32,
    running: bool,
    awaiting_confirmation: bool,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    ended_by: Option<EndReason>,
    summary: Option<ScoreSummary>,
}

impl QuizSession {
    pub fn new(bank: Arc<QuestionBank>, settings: QuizSettings, companies: BTreeSet<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            bank,
            settings,
            companies,
            phase: Phase::Setup,
            attempt: 0,
            questions: Vec::new(),
            answers: Vec::new(),
            flagged: BTreeSet::new(),
            current: 0,
            elapsed_secs: 0,
            running: false,
            awaiting_confirmation: false,
            started_at: None,
            finished_at: None,
            ended_by: None,
            summary: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Bumped on every `start`, so stale timers can tell they are stale.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_flagged(&self, index: usize) -> bool {
        self.flagged.contains(&index)
    }

    pub fn companies(&self) -> &BTreeSet<String> {
        &self.companies
    }

    pub fn remaining_secs(&self) -> u32 {
        self.settings.duration_secs.saturating_sub(self.elapsed_secs)
    }

    pub fn summary(&self) -> Option<&ScoreSummary> {
        self.summary.as_ref()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    /// Replaces the company filter. Only allowed before the quiz starts.
    pub fn set_companies(&mut self, companies: BTreeSet<String>) -> Result<(), SessionError> {
        if self.phase != Phase::Setup {
            return Err(SessionError::NotInSetup);
        }
        self.companies = companies;
        Ok(())
    }

    /// Materializes the session pool and starts the clock.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::Setup {
            return Err(SessionError::NotInSetup);
        }

        let mut pool = self.bank.filter_by_companies(&self.companies);
        if self.settings.shuffle {
            pool.shuffle(&mut rand::thread_rng());
        }

        self.questions = pool
            .into_iter()
            .take(self.settings.question_count)
            .cloned()
            .collect();
        self.answers = vec![None; self.questions.len()];
        self.flagged.clear();
        self.current = 0;
        self.elapsed_secs = 0;
        self.running = true;
        self.awaiting_confirmation = false;
        self.started_at = Some(Utc::now());
        self.finished_at = None;
        self.ended_by = None;
        self.summary = None;
        self.attempt += 1;
        self.phase = Phase::InProgress;

        Ok(())
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        if self.phase != Phase::InProgress {
            return Err(SessionError::NotInProgress);
        }
        Ok(())
    }

    /// Records `option_index` for the current question, overwriting any previous choice.
    pub fn select_answer(&mut self, option_index: usize) -> Result<(), SessionError> {
        self.ensure_in_progress()?;

        let options = self.questions[self.current].options.len();
        if option_index >= options {
            return Err(SessionError::OptionOutOfRange {
                index: option_index,
                options,
            });
        }

        self.answers[self.current] = Some(option_index);
        Ok(())
    }

    /// Flags or unflags the current question. Returns the new flag state.
    pub fn toggle_flag(&mut self) -> Result<bool, SessionError> {
        self.ensure_in_progress()?;

        if self.flagged.remove(&self.current) {
            Ok(false)
        } else {
            self.flagged.insert(self.current);
            Ok(true)
        }
    }

    /// Jumps to `index`, clamped to the last question.
    pub fn navigate(&mut self, index: usize) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        self.current = index.min(self.questions.len().saturating_sub(1));
        Ok(())
    }

    /// No-op on the first question.
    pub fn previous(&mut self) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        self.current = self.current.saturating_sub(1);
        Ok(())
    }

    /// No-op on the last question.
    pub fn next(&mut self) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        }
        Ok(())
    }

    /// Asks for confirmation. The clock keeps running until `confirm_submit`.
    pub fn submit(&mut self) -> Result<SubmitConfirmation, SessionError> {
        self.ensure_in_progress()?;

        let total = self.questions.len();
        let answered = self.answered_count();
        let unanswered = total - answered;
        let warning = (unanswered > 0).then(|| {
            format!(
                "You have {} unanswered question{}. Unanswered questions are marked incorrect.",
                unanswered,
                if unanswered == 1 { "" } else { "s" }
            )
        });

        self.awaiting_confirmation = true;

        Ok(SubmitConfirmation {
            answered,
            total,
            flagged: self.flagged.len(),
            unanswered,
            warning,
        })
    }

    pub fn cancel_submit(&mut self) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        self.awaiting_confirmation = false;
        Ok(())
    }

    /// Finalizes a submit that the user confirmed.
    pub fn confirm_submit(&mut self) -> Result<&ScoreSummary, SessionError> {
        self.ensure_in_progress()?;
        if !self.awaiting_confirmation {
            return Err(SessionError::NoPendingSubmit);
        }
        Ok(self.finish(EndReason::Submitted))
    }

    /// Finalizes without confirmation, as when the countdown runs out.
    pub fn time_up(&mut self) -> Result<&ScoreSummary, SessionError> {
        self.ensure_in_progress()?;
        Ok(self.finish(EndReason::TimeUp))
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) -> Tick {
        if !self.running || self.phase != Phase::InProgress {
            return Tick::Stopped;
        }

        self.elapsed_secs = (self.elapsed_secs + 1).min(self.settings.duration_secs);

        match self.remaining_secs() {
            0 => {
                self.finish(EndReason::TimeUp);
                Tick::TimeUp
            }
            remaining_secs => Tick::Running { remaining_secs },
        }
    }

    fn finish(&mut self, reason: EndReason) -> &ScoreSummary {
        self.running = false;
        self.awaiting_confirmation = false;
        self.phase = Phase::Result;
        self.ended_by = Some(reason);
        self.finished_at = Some(Utc::now());
        self.summary
            .insert(score::summarize(&self.questions, &self.answers))
    }

    /// Discards the finished attempt and returns to Setup. The company filter is kept.
    pub fn retry(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::Result {
            return Err(SessionError::NotFinished);
        }

        self.phase = Phase::Setup;
        self.questions.clear();
        self.answers.clear();
        self.flagged.clear();
        self.current = 0;
        self.elapsed_secs = 0;
        self.running = false;
        self.awaiting_confirmation = false;
        self.started_at = None;
        self.finished_at = None;
        self.ended_by = None;
        self.summary = None;

        Ok(())
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id,
            phase: self.phase,
            attempt: self.attempt,
            companies: self.companies.iter().cloned().collect(),
            total_questions: self.questions.len(),
            current_index: self.current,
            current_question: self.questions.get(self.current).map(PublicQuestion::from),
            answers: self.answers.clone(),
            flagged: self.flagged.iter().copied().collect(),
            answered_count: self.answered_count(),
            remaining_secs: self.remaining_secs(),
            running: self.running,
            awaiting_confirmation: self.awaiting_confirmation,
            started_at: self.started_at,
        }
    }

    /// Score and per-question review. Only available once the session is finished.
    pub fn result(&self) -> Result<ResultView, SessionError> {
        let (Some(summary), Some(ended_by)) = (&self.summary, self.ended_by) else {
            return Err(SessionError::NotFinished);
        };

        let review = self
            .questions
            .iter()
            .zip(self.answers.iter())
            .enumerate()
            .map(|(idx, (q, answer))| QuestionReview {
                id: q.id.clone(),
                prompt: q.prompt.clone(),
                options: q.options.clone(),
                selected_index: *answer,
                correct_answer_index: q.correct_answer_index,
                is_correct: *answer == Some(q.correct_answer_index),
                flagged: self.flagged.contains(&idx),
                explanation: q.explanation.clone(),
            })
            .collect();

        Ok(ResultView {
            session_id: self.id,
            ended_by,
            time_taken_secs: self.elapsed_secs,
            finished_at: self.finished_at,
            summary: summary.clone(),
            review,
        })
    }
}
