//! Authorization-code flow shared by every standard OAuth 2.0 / OpenID Connect provider.
//!
//! Provider presets (Google, generic OIDC) only differ in their default endpoints,
//! the user-info field holding the identity, and extra authorization parameters.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{
    configuration_error, flow_error, invalid_setting, missing_setting, ConfigurationErrorKind,
    Error, ErrorKind, FlowErrorKind,
};
use crate::http::HttpClient;
use crate::oauth::pkce::{PkceVerifier, CHALLENGE_METHOD};
use crate::oauth::{
    CompletedSession, InternalTokenGenerator, PendingSession, Properties, Provider, ProviderKind,
    ProviderResponse,
};

/// Lifetime of a pending session when no `pending_lifetime_secs` property is given.
pub const DEFAULT_PENDING_LIFETIME_SECS: i64 = 600;

/// Lifetime of a completed session when the token response has no `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

const LOGGED_URI_MAX_LEN: usize = 64;

const SCOPE: &str = "scope";
const CLIENT_ID: &str = "client_id";
const CLIENT_SECRET: &str = "client_secret";
const REDIRECT_URI: &str = "redirect_uri";
const AUTH_URL: &str = "auth_url";
const TOKEN_URL: &str = "token_url";
const USERINFO_URL: &str = "userinfo_url";
const USER_ID_FIELD: &str = "user_id_field";
const PENDING_LIFETIME_SECS: &str = "pending_lifetime_secs";

/// Endpoint URLs of a provider. `None` means the endpoint must come from properties.
#[derive(Debug, Clone, Default)]
pub struct Endpoints {
    pub auth_url: Option<String>,
    pub token_url: Option<String>,
    pub userinfo_url: Option<String>,
}

/// Settings validated by `configure()`; present only on a configured provider.
#[derive(Debug, Clone)]
struct FlowSettings {
    client_id: String,
    client_secret: SecretString,
    redirect_uri: Url,
    scope: String,
    auth_url: Url,
    token_url: Url,
    userinfo_url: Url,
}

/// Token endpoint response. Only the fields this crate consumes.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// OAuth 2.0 authorization-code provider with PKCE and CSRF state.
///
/// Setup methods only record values; they take effect at the next
/// [`Provider::configure`] call.
pub struct StandardProvider {
    kind: ProviderKind,
    client_id: Option<String>,
    client_secret: Option<SecretString>,
    redirect_uri: Option<String>,
    scope: Option<String>,
    endpoints: Endpoints,
    user_id_field: String,
    pending_lifetime: Duration,
    authorization_params: Vec<(String, String)>,
    http_client: HttpClient,
    flow: Option<FlowSettings>,
}

impl StandardProvider {
    /// Create an unconfigured provider.
    ///
    /// # Arguments
    ///
    /// * `kind` - Provider identity, also selects the property prefix
    /// * `endpoints` - Default endpoints, overridable through properties
    /// * `user_id_field` - User-info JSON field holding the user identifier
    pub fn new(kind: ProviderKind, endpoints: Endpoints, user_id_field: &str) -> Self {
        Self {
            kind,
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            scope: None,
            endpoints,
            user_id_field: user_id_field.to_string(),
            pending_lifetime: Duration::seconds(DEFAULT_PENDING_LIFETIME_SECS),
            authorization_params: Vec::new(),
            http_client: HttpClient::default(),
            flow: None,
        }
    }

    /// Use a custom HTTP client (retry policy, timeouts, or tests).
    pub fn with_http_client(mut self, http_client: HttpClient) -> Self {
        self.http_client = http_client;
        self
    }

    /// Add a fixed query parameter to every authorization request.
    pub fn with_authorization_param(mut self, name: &str, value: &str) -> Self {
        self.authorization_params
            .push((name.to_string(), value.to_string()));
        self
    }

    pub fn pending_lifetime(&self) -> Duration {
        self.pending_lifetime
    }

    pub fn user_id_field(&self) -> &str {
        &self.user_id_field
    }

    fn flow(&self) -> Result<&FlowSettings, Error> {
        self.flow.as_ref().ok_or_else(|| {
            configuration_error(
                ConfigurationErrorKind::NotConfigured,
                &format!("{} provider is not configured", self.kind),
            )
        })
    }

    fn validate(&self) -> Result<FlowSettings, Error> {
        let scope = self
            .scope
            .clone()
            .ok_or_else(|| missing_setting(&self.kind.property(SCOPE)))?;
        let client_id = self
            .client_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| missing_setting(&self.kind.property(CLIENT_ID)))?;
        let client_secret = self
            .client_secret
            .clone()
            .filter(|secret| !secret.expose_secret().is_empty())
            .ok_or_else(|| missing_setting(&self.kind.property(CLIENT_SECRET)))?;

        Ok(FlowSettings {
            client_id,
            client_secret,
            redirect_uri: self.required_url(REDIRECT_URI, self.redirect_uri.as_deref())?,
            scope,
            auth_url: self.required_url(AUTH_URL, self.endpoints.auth_url.as_deref())?,
            token_url: self.required_url(TOKEN_URL, self.endpoints.token_url.as_deref())?,
            userinfo_url: self
                .required_url(USERINFO_URL, self.endpoints.userinfo_url.as_deref())?,
        })
    }

    fn required_url(&self, setting: &str, value: Option<&str>) -> Result<Url, Error> {
        let name = self.kind.property(setting);
        let value = value.ok_or_else(|| missing_setting(&name))?;
        parse_url(&name, value)
    }

    fn optional_url(
        &self,
        properties: &Properties,
        setting: &str,
    ) -> Result<Option<String>, Error> {
        let name = self.kind.property(setting);
        match properties.get(&name) {
            Some(value) => parse_url(&name, value).map(|url| Some(url.to_string())),
            None => Ok(None),
        }
    }

    fn authorization_url(&self, flow: &FlowSettings, pending: &PendingSession) -> Url {
        let mut url = flow.auth_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &flow.client_id)
                .append_pair("redirect_uri", flow.redirect_uri.as_str())
                .append_pair("scope", &flow.scope)
                .append_pair("state", pending.state())
                .append_pair("code_challenge", &pending.pkce_verifier().challenge())
                .append_pair("code_challenge_method", CHALLENGE_METHOD);
            for (name, value) in &self.authorization_params {
                query.append_pair(name, value);
            }
        }
        url
    }

    async fn exchange_code(
        &self,
        flow: &FlowSettings,
        code: &str,
        pkce_verifier: &PkceVerifier,
    ) -> Result<TokenResponse, Error> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", flow.redirect_uri.as_str()),
            ("client_id", flow.client_id.as_str()),
            ("client_secret", flow.client_secret.expose_secret().as_str()),
            ("code_verifier", pkce_verifier.as_str()),
        ];

        debug!("Exchanging {} authorization code for tokens", self.kind);

        let response = self
            .http_client
            .single_attempt()
            .post(flow.token_url.clone())
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach {} token endpoint: {}", self.kind, e);
                Error::from(e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("{} token endpoint returned {}: {}", self.kind, status, error_text);
            return Err(flow_error(
                FlowErrorKind::TokenExchangeFailed,
                &format!("HTTP {}: {}", status, error_text),
            ));
        }

        response.json::<TokenResponse>().await.map_err(|e| {
            warn!("Failed to parse {} token response: {}", self.kind, e);
            invalid_response(e)
        })
    }

    async fn fetch_user_identifier(
        &self,
        flow: &FlowSettings,
        access_token: &str,
    ) -> Result<String, Error> {
        let response = self
            .http_client
            .retrying()
            .get(flow.userinfo_url.clone())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach {} user info endpoint: {}", self.kind, e);
                Error::from(e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("{} user info returned {}: {}", self.kind, status, error_text);
            return Err(flow_error(
                FlowErrorKind::UserInfoFailed,
                &format!("HTTP {}: {}", status, error_text),
            ));
        }

        let user_info: serde_json::Value = response.json().await.map_err(|e| {
            warn!("Failed to parse {} user info: {}", self.kind, e);
            invalid_response(e)
        })?;

        match user_info.get(&self.user_id_field) {
            Some(serde_json::Value::String(id)) if !id.is_empty() => Ok(id.clone()),
            Some(serde_json::Value::Number(id)) => Ok(id.to_string()),
            _ => Err(flow_error(
                FlowErrorKind::InvalidResponse,
                &format!("user info has no '{}' field", self.user_id_field),
            )),
        }
    }
}

#[async_trait]
impl Provider for StandardProvider {
    fn provider(&self) -> ProviderKind {
        self.kind
    }

    fn setup_credentials(&mut self, client_id: &str, client_secret: &str) {
        self.client_id = Some(client_id.to_string());
        self.client_secret = Some(SecretString::new(client_secret.to_string()));
    }

    fn setup_redirect_uri(&mut self, redirect_uri: &str) {
        self.redirect_uri = Some(redirect_uri.to_string());
    }

    fn setup_properties(&mut self, properties: &Properties) -> Result<(), Error> {
        let scope_name = self.kind.property(SCOPE);
        let scope = properties
            .get(&scope_name)
            .map(str::trim)
            .ok_or_else(|| missing_setting(&scope_name))?;
        if scope.is_empty() {
            return Err(invalid_setting(&scope_name, "scope must not be blank"));
        }

        let auth_url = self.optional_url(properties, AUTH_URL)?;
        let token_url = self.optional_url(properties, TOKEN_URL)?;
        let userinfo_url = self.optional_url(properties, USERINFO_URL)?;

        let user_id_field_name = self.kind.property(USER_ID_FIELD);
        let user_id_field = match properties.get(&user_id_field_name).map(str::trim) {
            Some("") => {
                return Err(invalid_setting(
                    &user_id_field_name,
                    "user id field must not be blank",
                ))
            }
            other => other,
        };

        let lifetime_name = self.kind.property(PENDING_LIFETIME_SECS);
        let pending_lifetime = match properties.get(&lifetime_name) {
            Some(value) => match value.trim().parse::<u32>() {
                Ok(secs) if secs > 0 => Some(Duration::seconds(i64::from(secs))),
                _ => {
                    return Err(invalid_setting(
                        &lifetime_name,
                        &format!("'{}' is not a positive number of seconds", value),
                    ))
                }
            },
            None => None,
        };

        // Everything parsed; apply all at once so a failure leaves no partial update.
        self.scope = Some(scope.to_string());
        if auth_url.is_some() {
            self.endpoints.auth_url = auth_url;
        }
        if token_url.is_some() {
            self.endpoints.token_url = token_url;
        }
        if userinfo_url.is_some() {
            self.endpoints.userinfo_url = userinfo_url;
        }
        if let Some(field) = user_id_field {
            self.user_id_field = field.to_string();
        }
        if let Some(lifetime) = pending_lifetime {
            self.pending_lifetime = lifetime;
        }
        Ok(())
    }

    fn configure(&mut self) -> Result<(), Error> {
        self.flow = None;
        let flow = self.validate().map_err(|e| {
            warn!("{} provider configuration rejected: {}", self.kind, e);
            e
        })?;
        self.flow = Some(flow);

        debug!("{} provider is now configured.", self.kind);
        Ok(())
    }

    fn is_configured(&self) -> bool {
        self.flow.is_some()
    }

    async fn start_authentication(&self, origin_uri: &Url) -> Result<ProviderResponse, Error> {
        let flow = self.flow()?;
        debug!("Start authentication from '{}'.", abbreviate(origin_uri));

        let pending = PendingSession::new(self.kind, origin_uri.clone(), self.pending_lifetime);
        let redirect_uri = self.authorization_url(flow, &pending);

        debug!("Redirect user to '{}'.", abbreviate(&redirect_uri));
        Ok(ProviderResponse::new(pending.into(), Some(redirect_uri))
            .with_header("Cache-Control", "no-store")
            .with_header("Pragma", "no-cache"))
    }

    async fn finish_authentication(
        &self,
        pending: &PendingSession,
        code: &str,
        state: &str,
        internal_token_generator: &InternalTokenGenerator,
    ) -> Result<ProviderResponse, Error> {
        let flow = self.flow()?;
        debug!(
            "Finish authentication from '{}'.",
            abbreviate(pending.origin_uri())
        );

        if pending.provider() != self.kind {
            warn!(
                "Rejected {} callback for a session started with {}",
                self.kind,
                pending.provider()
            );
            return Err(flow_error(
                FlowErrorKind::ProviderMismatch,
                &format!("session was started with the {} provider", pending.provider()),
            ));
        }
        if pending.is_expired(Utc::now()) {
            warn!("Callback arrived for an expired {} session", self.kind);
            return Err(flow_error(
                FlowErrorKind::SessionExpired,
                "pending session expired before the callback",
            ));
        }
        if state != pending.state() {
            warn!("Rejected {} callback with mismatched state", self.kind);
            return Err(flow_error(
                FlowErrorKind::InvalidState,
                "state parameter does not match the pending session",
            ));
        }

        let tokens = self
            .exchange_code(flow, code, pending.pkce_verifier())
            .await?;
        let user_identifier = self.fetch_user_identifier(flow, &tokens.access_token).await?;
        let internal_token = internal_token_generator(&tokens.access_token);

        let completed = CompletedSession::new(
            internal_token,
            SecretString::new(tokens.access_token),
            user_identifier,
            pending.origin_uri().clone(),
            expiry_from(Utc::now(), tokens.expires_in),
        );

        info!(
            "User '{}' authenticated with {}",
            completed.user_identifier(),
            self.kind
        );
        Ok(ProviderResponse::new(
            completed.into(),
            Some(pending.origin_uri().clone()),
        ))
    }
}

fn parse_url(name: &str, value: &str) -> Result<Url, Error> {
    Url::parse(value.trim()).map_err(|e| invalid_setting(name, &format!("'{}': {}", value, e)))
}

fn invalid_response(err: reqwest::Error) -> Error {
    Error {
        source: Some(Box::new(err)),
        error_kind: ErrorKind::Flow(FlowErrorKind::InvalidResponse),
    }
}

/// Expiry of a completed session from the provider's `expires_in`.
///
/// A missing or non-positive lifetime falls back to the default; one too large
/// to represent saturates at the latest representable time.
fn expiry_from(now: DateTime<Utc>, expires_in: Option<i64>) -> DateTime<Utc> {
    match expires_in {
        Some(secs) if secs > 0 => Duration::try_seconds(secs)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC),
        _ => now + Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS),
    }
}

/// Shorten a URI for log lines.
fn abbreviate(uri: &Url) -> String {
    let uri = uri.as_str();
    if uri.len() <= LOGGED_URI_MAX_LEN {
        uri.to_string()
    } else {
        format!("{}...", &uri[..LOGGED_URI_MAX_LEN])
    }
}
