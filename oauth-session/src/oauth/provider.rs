//! OAuth provider contract and the flow response envelope.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use super::properties::Properties;
use super::session::{PendingSession, Session};
use crate::error::Error;

/// Function minting the host-facing internal token from a provider access token.
pub type InternalTokenGenerator = dyn Fn(&str) -> String + Send + Sync;

/// Known identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Google,
    Oidc,
}

impl ProviderKind {
    /// Get the provider identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
            ProviderKind::Oidc => "oidc",
        }
    }

    /// Prefix of every property this provider reads, e.g. `oauth2.google`.
    pub fn property_prefix(&self) -> &'static str {
        match self {
            ProviderKind::Google => "oauth2.google",
            ProviderKind::Oidc => "oauth2.oidc",
        }
    }

    /// Full property name for `setting`, e.g. `oauth2.google.scope`.
    pub fn property(&self, setting: &str) -> String {
        format!("{}.{}", self.property_prefix(), setting)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a flow operation: the session, where to send the user agent next,
/// and any headers to attach to that redirect.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub session: Session,
    /// Consent page after a start, origin URI after a finish.
    pub redirect_uri: Option<Url>,
    pub headers: HashMap<String, String>,
}

impl ProviderResponse {
    pub fn new(session: Session, redirect_uri: Option<Url>) -> Self {
        Self {
            session,
            redirect_uri,
            headers: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Trait for OAuth 2.0 identity providers.
///
/// Setup methods take `&mut self` and are called once at startup, ending with
/// [`Provider::configure`]. Flow methods take `&self`, so a configured provider
/// can be shared behind an `Arc` without locking.
///
/// Flow methods on a provider that is not configured fail with
/// `ConfigurationErrorKind::NotConfigured`.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider kind.
    fn provider(&self) -> ProviderKind;

    /// Record the provider-issued client credentials.
    fn setup_credentials(&mut self, client_id: &str, client_secret: &str);

    /// Record the callback URI the provider redirects to after consent.
    fn setup_redirect_uri(&mut self, redirect_uri: &str);

    /// Read provider-specific options.
    ///
    /// Fails when a required option (such as the scope) is absent or any option
    /// is malformed.
    fn setup_properties(&mut self, properties: &Properties) -> Result<(), Error>;

    /// Validate every setting and mark the provider ready to serve flows.
    ///
    /// The error names the first missing or malformed setting. A failed call
    /// leaves the provider unconfigured. Calling again re-validates.
    fn configure(&mut self) -> Result<(), Error>;

    fn is_configured(&self) -> bool;

    /// Begin an authorization-code flow for a user heading to `origin_uri`.
    ///
    /// Returns a pending session remembering `origin_uri` and a redirect to the
    /// provider's consent page.
    async fn start_authentication(&self, origin_uri: &Url) -> Result<ProviderResponse, Error>;

    /// Complete the flow started for `pending` with the callback's `code` and `state`.
    ///
    /// `state` must match the one issued at start. The returned completed session
    /// carries `pending`'s origin URI and an internal token produced by
    /// `internal_token_generator` from the access token.
    async fn finish_authentication(
        &self,
        pending: &PendingSession,
        code: &str,
        state: &str,
        internal_token_generator: &InternalTokenGenerator,
    ) -> Result<ProviderResponse, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_names() {
        assert_eq!(ProviderKind::Google.property("scope"), "oauth2.google.scope");
        assert_eq!(ProviderKind::Oidc.property("auth_url"), "oauth2.oidc.auth_url");
    }

    #[test]
    fn test_provider_kind_serde() {
        assert_eq!(
            serde_json::to_string(&ProviderKind::Google).unwrap(),
            "\"google\""
        );
        let kind: ProviderKind = serde_json::from_str("\"oidc\"").unwrap();
        assert_eq!(kind, ProviderKind::Oidc);
    }
}
