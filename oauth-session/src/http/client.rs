//! Provider HTTP client.

use std::time::Duration;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::RetryTransientMiddleware;

use super::BackoffPolicy;

/// HTTP client shared by providers.
///
/// The token exchange sends a single-use authorization code, so it only ever gets
/// one attempt. Idempotent lookups such as user info may be retried.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    retrying: ClientWithMiddleware,
}

impl HttpClient {
    /// Wrap a plain client; nothing is retried.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            retrying: ClientBuilder::new(client.clone()).build(),
            client,
        }
    }

    /// Client for requests that must not be replayed.
    pub fn single_attempt(&self) -> &reqwest::Client {
        &self.client
    }

    /// Client for idempotent requests, retrying transient failures.
    pub fn retrying(&self) -> &ClientWithMiddleware {
        &self.retrying
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::from_client(reqwest::Client::new())
    }
}

/// Builds the [`HttpClient`] with a timeout, the crate user agent and
/// [`BackoffPolicy`] retries for idempotent requests.
pub struct HttpClientBuilder {
    timeout: Duration,
    max_retries: u32,
    retry_budget: Duration,
}

impl HttpClientBuilder {
    /// 30 s timeout, 3 retries, 120 s retry budget.
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_budget: Duration::from_secs(120),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the total time a failing request may spend in retries.
    pub fn with_retry_budget(mut self, retry_budget: Duration) -> Self {
        self.retry_budget = retry_budget;
        self
    }

    pub fn build(self) -> Result<HttpClient, reqwest::Error> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(self.timeout)
            .user_agent(concat!("oauth-session/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let retry_policy =
            BackoffPolicy::new(self.max_retries).with_max_elapsed(self.retry_budget);
        let retrying = ClientBuilder::new(client.clone())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(HttpClient { client, retrying })
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
