//! In-memory session collection with expiration.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::session::{CompletedSession, PendingSession, Session, SessionKey, Stage};

/// Sorted store of pending and completed sessions.
///
/// Entries are ordered like [`Session`]: completed sessions first, then pending
/// sessions, each by token. Taking a pending session removes it, so a callback
/// can complete it at most once.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<BTreeMap<SessionKey, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<SessionKey, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a session, replacing any session with the same phase and token.
    pub fn insert(&self, session: Session) {
        self.lock().insert(session.key(), session);
    }

    /// Remove and return a live pending session.
    ///
    /// Returns `None` if the token is unknown, already taken, or expired at `now`.
    pub fn take_pending(
        &self,
        temporary_token: &str,
        now: DateTime<Utc>,
    ) -> Option<PendingSession> {
        let session = self.lock().remove(&SessionKey::pending(temporary_token))?;
        if session.is_expired(now) {
            debug!("Dropped expired pending session on lookup");
            return None;
        }
        session.into_pending()
    }

    /// Look up a live completed session by its internal token.
    pub fn authenticated(
        &self,
        internal_token: &str,
        now: DateTime<Utc>,
    ) -> Option<CompletedSession> {
        self.lock()
            .get(&SessionKey::completed(internal_token))
            .filter(|session| !session.is_expired(now))
            .and_then(Session::as_completed)
            .cloned()
    }

    /// Remove a session. Returns whether it was present.
    pub fn remove(&self, session: &Session) -> bool {
        self.lock().remove(&session.key()).is_some()
    }

    /// Drop every session expired at `now`. Returns how many were dropped.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        let swept = before - sessions.len();
        if swept > 0 {
            debug!("Swept {} expired sessions", swept);
        }
        swept
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of sessions still waiting for their callback.
    pub fn pending_count(&self) -> usize {
        self.lock()
            .keys()
            .filter(|key| key.stage == Stage::Pending)
            .count()
    }

    /// Snapshot of every session in sort order.
    pub fn sessions(&self) -> Vec<Session> {
        self.lock().values().cloned().collect()
    }
}
