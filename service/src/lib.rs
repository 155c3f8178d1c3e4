use chrono::Utc;
use config::Config;
use log::{info, warn};
use oauth_session::error::{
    configuration_error, flow_error, missing_setting, ConfigurationErrorKind, Error,
    FlowErrorKind,
};
use oauth_session::http::{HttpClient, HttpClientBuilder};
use oauth_session::oauth::providers::{google, oidc};
use oauth_session::oauth::token::sha256_hex;
use oauth_session::oauth::{
    CompletedSession, Properties, Provider, ProviderKind, ProviderRegistry, ProviderResponse,
    SessionStore,
};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub mod config;
pub mod logging;

pub fn init_http_client(config: &Config) -> Result<HttpClient, Error> {
    info!(
        "Provider HTTP client config: timeout={}s, max_retries={}",
        config.http_timeout_secs, config.http_max_retries,
    );

    let client = HttpClientBuilder::new()
        .with_timeout(Duration::from_secs(config.http_timeout_secs))
        .with_max_retries(config.http_max_retries)
        .build()?;

    Ok(client)
}

/// Builds and configures every provider that has a client ID set.
///
/// Google is enabled by `--google-client-id`, generic OIDC by `--oidc-client-id`.
/// Fails if no provider is enabled or any enabled provider fails to configure.
pub fn init_registry(config: &Config) -> Result<ProviderRegistry, Error> {
    let properties = config.properties()?;
    let http_client = init_http_client(config)?;
    let mut registry = ProviderRegistry::new();

    if let Some(client_id) = config.google_client_id() {
        let mut provider = google::new_provider().with_http_client(http_client.clone());
        configure_provider(
            &mut provider,
            client_id,
            config.google_client_secret(),
            Some(config.google_redirect_uri()),
            &properties,
        )?;
        registry.register(Arc::new(provider))?;
    }

    if let Some(client_id) = config.oidc_client_id() {
        let mut provider = oidc::new_provider().with_http_client(http_client);
        configure_provider(
            &mut provider,
            client_id,
            config.oidc_client_secret(),
            config.oidc_redirect_uri(),
            &properties,
        )?;
        registry.register(Arc::new(provider))?;
    }

    if registry.is_empty() {
        warn!("No OAuth provider has a client ID configured");
        return Err(missing_setting(&ProviderKind::Google.property("client_id")));
    }

    Ok(registry)
}

fn configure_provider(
    provider: &mut dyn Provider,
    client_id: &str,
    client_secret: Option<&str>,
    redirect_uri: Option<&str>,
    properties: &Properties,
) -> Result<(), Error> {
    // Missing values are left empty so configure() names the missing setting
    provider.setup_credentials(client_id, client_secret.unwrap_or_default());
    provider.setup_redirect_uri(redirect_uri.unwrap_or_default());
    provider.setup_properties(properties)?;
    provider.configure()
}

// Service-level state shared by every login flow
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    registry: ProviderRegistry,
    sessions: SessionStore,
}

impl AppState {
    pub fn new(app_config: Config, registry: ProviderRegistry) -> Self {
        Self {
            config: app_config,
            registry,
            sessions: SessionStore::new(),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    fn provider(&self, kind: ProviderKind) -> Result<Arc<dyn Provider>, Error> {
        self.registry.get(kind).ok_or_else(|| {
            configuration_error(
                ConfigurationErrorKind::NotConfigured,
                &format!("{} provider is not registered", kind),
            )
        })
    }

    /// Starts a login with `kind` and remembers the pending session.
    pub async fn begin_authentication(
        &self,
        kind: ProviderKind,
        origin_uri: &Url,
    ) -> Result<ProviderResponse, Error> {
        let response = self
            .provider(kind)?
            .start_authentication(origin_uri)
            .await?;
        self.sessions.insert(response.session.clone());
        Ok(response)
    }

    /// Completes the login identified by `temporary_token` with the callback
    /// `code` and `state`. The pending session is consumed whatever the outcome.
    pub async fn complete_authentication(
        &self,
        kind: ProviderKind,
        temporary_token: &str,
        code: &str,
        state: &str,
    ) -> Result<ProviderResponse, Error> {
        let provider = self.provider(kind)?;
        let pending = self
            .sessions
            .take_pending(temporary_token, Utc::now())
            .ok_or_else(|| {
                flow_error(
                    FlowErrorKind::UnknownSession,
                    "no live pending session for this callback",
                )
            })?;

        let response = provider
            .finish_authentication(&pending, code, state, &sha256_hex)
            .await?;
        self.sessions.insert(response.session.clone());
        Ok(response)
    }

    pub fn authenticated_session(&self, internal_token: &str) -> Option<CompletedSession> {
        self.sessions.authenticated(internal_token, Utc::now())
    }

    /// Drops expired sessions. Returns how many were dropped.
    pub fn sweep_expired(&self) -> usize {
        self.sessions.sweep_expired(Utc::now())
    }
}
