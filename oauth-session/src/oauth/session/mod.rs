//! Session model: the two phases of one user's OAuth2 interaction.
//!
//! A session is either pending (flow started, waiting for the callback) or
//! completed (provider confirmed the identity). Expiry is not a stored state;
//! it is evaluated against a supplied clock with [`Session::is_expired`].
//!
//! Sessions are totally ordered: completed sessions sort before pending ones,
//! and sessions of the same phase sort by their identity token. A sorted
//! collection therefore holds every completed session first and every pending
//! session in the tail, which is where expiry sweeps look.

mod completed;
mod pending;

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use url::Url;

pub use completed::CompletedSession;
pub use pending::PendingSession;

/// Phase of a session. Declaration order is the sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Completed,
    Pending,
}

/// Sort and lookup key of a session: its phase, then its identity token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionKey {
    pub stage: Stage,
    pub token: String,
}

impl SessionKey {
    pub fn pending(temporary_token: &str) -> Self {
        Self {
            stage: Stage::Pending,
            token: temporary_token.to_string(),
        }
    }

    pub fn completed(internal_token: &str) -> Self {
        Self {
            stage: Stage::Completed,
            token: internal_token.to_string(),
        }
    }
}

/// One user's OAuth2 session, in either phase.
#[derive(Debug, Clone)]
pub enum Session {
    Pending(PendingSession),
    Completed(CompletedSession),
}

impl Session {
    pub fn stage(&self) -> Stage {
        match self {
            Session::Pending(_) => Stage::Pending,
            Session::Completed(_) => Stage::Completed,
        }
    }

    /// The resource the user was trying to reach when the flow started.
    pub fn origin_uri(&self) -> &Url {
        match self {
            Session::Pending(pending) => pending.origin_uri(),
            Session::Completed(completed) => completed.origin_uri(),
        }
    }

    /// Identity token: the internal token once completed, the temporary token before.
    pub fn token(&self) -> &str {
        match self {
            Session::Pending(pending) => pending.temporary_token(),
            Session::Completed(completed) => completed.internal_token(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Completed(_))
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        match self {
            Session::Pending(pending) => pending.expires_at(),
            Session::Completed(completed) => completed.expires_at(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    pub fn key(&self) -> SessionKey {
        SessionKey {
            stage: self.stage(),
            token: self.token().to_string(),
        }
    }

    pub fn as_pending(&self) -> Option<&PendingSession> {
        match self {
            Session::Pending(pending) => Some(pending),
            Session::Completed(_) => None,
        }
    }

    pub fn as_completed(&self) -> Option<&CompletedSession> {
        match self {
            Session::Completed(completed) => Some(completed),
            Session::Pending(_) => None,
        }
    }

    pub fn into_pending(self) -> Option<PendingSession> {
        match self {
            Session::Pending(pending) => Some(pending),
            Session::Completed(_) => None,
        }
    }

    pub fn into_completed(self) -> Option<CompletedSession> {
        match self {
            Session::Completed(completed) => Some(completed),
            Session::Pending(_) => None,
        }
    }
}

impl From<PendingSession> for Session {
    fn from(pending: PendingSession) -> Self {
        Session::Pending(pending)
    }
}

impl From<CompletedSession> for Session {
    fn from(completed: CompletedSession) -> Self {
        Session::Completed(completed)
    }
}

impl Ord for Session {
    fn cmp(&self, other: &Self) -> Ordering {
        self.stage()
            .cmp(&other.stage())
            .then_with(|| self.token().cmp(other.token()))
    }
}

impl PartialOrd for Session {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Session {}
