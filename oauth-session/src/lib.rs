//! # oauth-session
//!
//! Server-side lifecycle of third-party OAuth 2.0 logins:
//! - Pending and completed sessions with expiry and a total order
//! - The provider contract every identity provider implements
//! - Google and generic OpenID Connect providers (authorization code + PKCE)
//! - An in-memory session store and a provider registry
//! - HTTP client building with retry middleware
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oauth_session::oauth::{providers::google, token::sha256_hex, Properties, Provider};
//!
//! let mut provider = google::new_provider();
//! provider.setup_credentials(&client_id, &client_secret);
//! provider.setup_redirect_uri("https://host/oauth/callback");
//! provider.setup_properties(&Properties::new().with(google::SCOPE_PROPERTY, "profile"))?;
//! provider.configure()?;
//!
//! let started = provider.start_authentication(&origin_uri).await?;
//! // ... user consents, provider calls back with `code` and `state` ...
//! let pending = started.session.into_pending().unwrap();
//! let finished = provider
//!     .finish_authentication(&pending, &code, &state, &sha256_hex)
//!     .await?;
//! ```

pub mod error;
pub mod http;
pub mod oauth;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
