//! Sessions the provider has confirmed.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use url::Url;

/// A session created once the provider confirmed the user's identity.
///
/// Immutable once built. The internal token is minted by the host and is the key
/// the host uses for this session from now on.
#[derive(Debug, Clone)]
pub struct CompletedSession {
    internal_token: String,
    access_token: SecretString,
    user_identifier: String,
    origin_uri: Url,
    expires_at: DateTime<Utc>,
}

impl CompletedSession {
    pub fn new(
        internal_token: String,
        access_token: SecretString,
        user_identifier: String,
        origin_uri: Url,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            internal_token,
            access_token,
            user_identifier,
            origin_uri,
            expires_at,
        }
    }

    pub fn internal_token(&self) -> &str {
        &self.internal_token
    }

    /// The provider's OAuth2 access token.
    pub fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    /// Provider-resolved identity (e.g. Google profile id).
    pub fn user_identifier(&self) -> &str {
        &self.user_identifier
    }

    pub fn origin_uri(&self) -> &Url {
        &self.origin_uri
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
