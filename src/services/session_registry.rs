// src/services/session_registry.rs

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::{Instant, MissedTickBehavior};
use uuid::Uuid;

use crate::{
    models::quiz::Phase,
    services::{
        question_bank::QuestionBank,
        quiz_session::{QuizSession, QuizSettings, SessionError, Tick},
    },
};

pub type SharedSession = Arc<Mutex<QuizSession>>;

type SessionMap = RwLock<HashMap<Uuid, Entry>>;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

struct Entry {
    session: SharedSession,
    /// Last time a request looked the session up.
    last_seen: Instant,
}

/// Owns every live quiz session.
///
/// Each session sits behind its own mutex, so user actions and timer ticks on
/// one session are applied one at a time.
#[derive(Clone)]
pub struct SessionRegistry {
    bank: Arc<QuestionBank>,
    settings: QuizSettings,
    sessions: Arc<SessionMap>,
}

impl SessionRegistry {
    pub fn new(bank: Arc<QuestionBank>, settings: QuizSettings) -> Self {
        Self {
            bank,
            settings,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Creates a session with the given company filter and starts it right away.
    pub async fn create(&self, companies: BTreeSet<String>) -> Result<SharedSession, SessionError> {
        let session = QuizSession::new(self.bank.clone(), self.settings, companies);
        let id = session.id();
        let shared = Arc::new(Mutex::new(session));

        self.sessions.write().await.insert(
            id,
            Entry {
                session: shared.clone(),
                last_seen: Instant::now(),
            },
        );
        tracing::info!(session_id = %id, "Quiz session created");

        self.start(&shared, None).await?;
        Ok(shared)
    }

    /// Looks a session up and marks it as recently used.
    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some(entry.session.clone())
    }

    /// Starts a session that is in Setup and spawns its countdown.
    pub async fn start(
        &self,
        session: &SharedSession,
        companies: Option<BTreeSet<String>>,
    ) -> Result<(), SessionError> {
        let mut guard = session.lock().await;
        if let Some(companies) = companies {
            guard.set_companies(companies)?;
        }
        guard.start()?;

        tracing::info!(
            session_id = %guard.id(),
            attempt = guard.attempt(),
            questions = guard.questions().len(),
            "Quiz started"
        );

        spawn_countdown(Arc::downgrade(session), guard.id(), guard.attempt());
        Ok(())
    }

    /// Drops the session. Its countdown stops on the next tick.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Quiz session removed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Evicts sessions that are not in progress and were not looked up for `idle_ttl`.
    /// Returns how many were removed.
    pub async fn sweep(&self, idle_ttl: Duration) -> usize {
        sweep_idle(&self.sessions, idle_ttl).await
    }

    /// Runs `sweep` every `every` until the registry is dropped.
    pub fn spawn_sweeper(&self, every: Duration, idle_ttl: Duration) {
        let sessions = Arc::downgrade(&self.sessions);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + every, every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                let Some(sessions) = sessions.upgrade() else {
                    break;
                };
                sweep_idle(&sessions, idle_ttl).await;
            }
        });
    }
}

/// InProgress sessions are never evicted: their countdown always moves them to Result.
/// A session whose lock is held is in use and is skipped.
async fn sweep_idle(sessions: &SessionMap, idle_ttl: Duration) -> usize {
    let now = Instant::now();
    let mut sessions = sessions.write().await;
    let before = sessions.len();

    sessions.retain(|id, entry| {
        if now.duration_since(entry.last_seen) < idle_ttl {
            return true;
        }
        match entry.session.try_lock() {
            Ok(guard) if guard.phase() != Phase::InProgress => {
                tracing::debug!(session_id = %id, phase = ?guard.phase(), "Evicting idle session");
                false
            }
            _ => true,
        }
    });

    let removed = before - sessions.len();
    if removed > 0 {
        tracing::info!(removed, remaining = sessions.len(), "Idle quiz sessions swept");
    }
    removed
}

/// One ticking clock per started attempt.
///
/// Holds only a weak handle, and exits as soon as the session is gone, no
/// longer running, or restarted under a newer attempt.
fn spawn_countdown(session: Weak<Mutex<QuizSession>>, id: Uuid, attempt: u32) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

        loop {
            interval.tick().await;

            let Some(session) = session.upgrade() else {
                tracing::debug!(session_id = %id, "Session dropped, stopping countdown");
                break;
            };
            let mut guard = session.lock().await;

            if guard.attempt() != attempt {
                break;
            }

            match guard.tick() {
                Tick::Running { .. } => {}
                Tick::TimeUp => {
                    tracing::info!(
                        session_id = %id,
                        attempt,
                        answered = guard.answered_count(),
                        "Time is up, quiz auto-submitted"
                    );
                    break;
                }
                Tick::Stopped => break,
            }
        }
    });
}
