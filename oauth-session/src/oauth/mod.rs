//! OAuth 2.0 session lifecycle.
//!
//! A provider starts an authorization-code flow and hands back a pending
//! session; the provider callback turns it into a completed session bound to
//! the same origin URI.

mod pkce;
mod properties;
mod provider;
mod registry;
mod session;
mod store;

pub mod providers;
pub mod token;

pub use pkce::{PkceVerifier, CHALLENGE_METHOD};
pub use properties::Properties;
pub use provider::{InternalTokenGenerator, Provider, ProviderKind, ProviderResponse};
pub use registry::ProviderRegistry;
pub use session::{CompletedSession, PendingSession, Session, SessionKey, Stage};
pub use store::SessionStore;
