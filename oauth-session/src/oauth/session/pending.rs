//! Sessions waiting for the provider callback.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use url::Url;

use crate::oauth::pkce::PkceVerifier;
use crate::oauth::token::random_token;
use crate::oauth::ProviderKind;

/// A session created when an authentication flow starts.
///
/// Holds everything needed to validate and complete the callback: the temporary
/// token the host indexes it by, the CSRF state and PKCE verifier sent with the
/// authorization request, the provider that issued it, and the resource the user
/// originally asked for.
#[derive(Clone)]
pub struct PendingSession {
    provider: ProviderKind,
    temporary_token: String,
    origin_uri: Url,
    state: String,
    pkce_verifier: PkceVerifier,
    expires_at: DateTime<Utc>,
}

impl PendingSession {
    /// Create a pending session with fresh random tokens, obsolete after `lifetime`.
    pub fn new(provider: ProviderKind, origin_uri: Url, lifetime: Duration) -> Self {
        Self::from_parts(
            provider,
            random_token(),
            origin_uri,
            random_token(),
            PkceVerifier::generate(),
            Utc::now() + lifetime,
        )
    }

    /// Rebuild a pending session from known values.
    pub fn from_parts(
        provider: ProviderKind,
        temporary_token: String,
        origin_uri: Url,
        state: String,
        pkce_verifier: PkceVerifier,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            provider,
            temporary_token,
            origin_uri,
            state,
            pkce_verifier,
            expires_at,
        }
    }

    /// Provider that started the flow and must finish it.
    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn temporary_token(&self) -> &str {
        &self.temporary_token
    }

    pub fn origin_uri(&self) -> &Url {
        &self.origin_uri
    }

    /// CSRF state issued with the authorization request.
    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn pkce_verifier(&self) -> &PkceVerifier {
        &self.pkce_verifier
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// A pending session with no callback by `expires_at` is abandoned.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl fmt::Debug for PendingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingSession")
            .field("provider", &self.provider)
            .field("temporary_token", &self.temporary_token)
            .field("origin_uri", &self.origin_uri.as_str())
            .field("state", &"[REDACTED]")
            .field("pkce_verifier", &self.pkce_verifier)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
