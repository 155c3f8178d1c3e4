//! Generic OpenID Connect provider preset.
//!
//! No endpoint defaults: `oauth2.oidc.auth_url`, `oauth2.oidc.token_url` and
//! `oauth2.oidc.userinfo_url` must come from properties or [`Endpoints`].

use super::standard::{Endpoints, StandardProvider};
use crate::oauth::ProviderKind;

/// OIDC user-info claim identifying the user.
pub const USER_ID_FIELD: &str = "sub";

/// Create an unconfigured OIDC provider whose endpoints come from properties.
pub fn new_provider() -> StandardProvider {
    with_endpoints(Endpoints::default())
}

/// Create an unconfigured OIDC provider with known endpoints.
pub fn with_endpoints(endpoints: Endpoints) -> StandardProvider {
    StandardProvider::new(ProviderKind::Oidc, endpoints, USER_ID_FIELD)
}
