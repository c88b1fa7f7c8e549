//! Diagnosis session registry
//!
//! Every open questionnaire is an explicit [`DiagnosisSession`] keyed by a
//! random UUID. Handlers hold the lock only for the duration of one
//! operation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use medassist_diagnosis::{
    DiagnosisModel, DiagnosisResult, DiagnosisSession, SessionError, SessionState,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown diagnosis session {0}")]
    UnknownSession(Uuid),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Client-facing snapshot of a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionView {
    pub session_id: Uuid,
    pub state: SessionState,
    /// Symptom column asked next, `None` once terminal
    pub question: Option<String>,
    pub question_text: Option<String>,
    pub asked: Vec<String>,
    pub result: Option<DiagnosisResult>,
}

impl SessionView {
    fn from_session(session_id: Uuid, session: &DiagnosisSession) -> Result<Self, SessionError> {
        let result = if session.is_terminal() {
            Some(session.result()?)
        } else {
            None
        };

        Ok(Self {
            session_id,
            state: session.state(),
            question: session.current_question().map(str::to_string),
            question_text: session.question_text(),
            asked: session.asked().into_iter().map(str::to_string).collect(),
            result,
        })
    }
}

/// Sessions untouched for this long are discarded.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);
/// Open sessions kept at most; the least recently used go first.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

#[derive(Debug)]
struct SessionEntry {
    session: DiagnosisSession,
    last_touched: Instant,
}

#[derive(Debug)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
    ttl: Duration,
    max_sessions: usize,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_limits(DEFAULT_SESSION_TTL, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn create(&self, model: Arc<DiagnosisModel>) -> Result<SessionView, RegistryError> {
        let id = Uuid::new_v4();
        let session = DiagnosisSession::new(model);
        let view = SessionView::from_session(id, &session)?;

        let now = Instant::now();
        let mut sessions = self.sessions.lock();
        self.evict(&mut sessions, now);
        sessions.insert(
            id,
            SessionEntry {
                session,
                last_touched: now,
            },
        );
        Ok(view)
    }

    pub fn view(&self, id: Uuid) -> Result<SessionView, RegistryError> {
        let mut sessions = self.sessions.lock();
        let entry = self.live_entry(&mut sessions, id, Instant::now())?;
        Ok(SessionView::from_session(id, &entry.session)?)
    }

    pub fn answer(&self, id: Uuid, present: bool) -> Result<SessionView, RegistryError> {
        let mut sessions = self.sessions.lock();
        let entry = self.live_entry(&mut sessions, id, Instant::now())?;

        entry.session.answer(present)?;
        Ok(SessionView::from_session(id, &entry.session)?)
    }

    /// Discard a session and its answers. Returns whether it existed.
    pub fn remove(&self, id: Uuid) -> bool {
        self.sessions.lock().remove(&id).is_some()
    }

    /// Drop every session idle at `now`. Returns how many were dropped.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        self.evict(&mut sessions, now);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    fn is_idle(&self, entry: &SessionEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.last_touched) > self.ttl
    }

    /// Expired sessions go first; then the least recently touched until
    /// there is room for one more.
    fn evict(&self, sessions: &mut HashMap<Uuid, SessionEntry>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_idle(entry, now));

        if sessions.len() >= self.max_sessions {
            let mut by_age: Vec<(Instant, Uuid)> = sessions
                .iter()
                .map(|(id, entry)| (entry.last_touched, *id))
                .collect();
            by_age.sort();
            let excess = sessions.len() + 1 - self.max_sessions;
            for (_, id) in by_age.into_iter().take(excess) {
                sessions.remove(&id);
            }
        }

        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!("Evicted {} diagnosis sessions", evicted);
        }
    }

    fn live_entry<'a>(
        &self,
        sessions: &'a mut HashMap<Uuid, SessionEntry>,
        id: Uuid,
        now: Instant,
    ) -> Result<&'a mut SessionEntry, RegistryError> {
        let idle = match sessions.get(&id) {
            Some(entry) => self.is_idle(entry, now),
            None => return Err(RegistryError::UnknownSession(id)),
        };
        if idle {
            sessions.remove(&id);
            return Err(RegistryError::UnknownSession(id));
        }

        let entry = sessions
            .get_mut(&id)
            .ok_or(RegistryError::UnknownSession(id))?;
        entry.last_touched = now;
        Ok(entry)
    }
}
