//! Google OAuth provider preset.

use super::standard::{Endpoints, StandardProvider};
use crate::oauth::ProviderKind;

/// Google consent page.
pub const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
/// Google token endpoint.
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Google profile endpoint; its `id` field is the user identifier.
pub const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v1/userinfo?alt=json";
pub const USER_ID_FIELD: &str = "id";

/// Property holding the space-separated scopes to request.
pub const SCOPE_PROPERTY: &str = "oauth2.google.scope";

/// Create an unconfigured Google OAuth provider.
///
/// Endpoints default to Google's and can be overridden with the
/// `oauth2.google.auth_url`, `oauth2.google.token_url` and
/// `oauth2.google.userinfo_url` properties.
///
/// ```rust,ignore
/// let mut provider = google::new_provider();
/// provider.setup_credentials(&client_id, &client_secret);
/// provider.setup_redirect_uri("https://host/oauth/callback");
/// provider.setup_properties(&properties)?;
/// provider.configure()?;
/// ```
pub fn new_provider() -> StandardProvider {
    StandardProvider::new(
        ProviderKind::Google,
        Endpoints {
            auth_url: Some(AUTH_URL.to_string()),
            token_url: Some(TOKEN_URL.to_string()),
            userinfo_url: Some(USERINFO_URL.to_string()),
        },
        USER_ID_FIELD,
    )
    .with_authorization_param("access_type", "online")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigurationErrorKind, ErrorKind};
    use crate::http::HttpClientBuilder;
    use crate::oauth::token::sha256_hex;
    use crate::oauth::{Properties, Provider};
    use mockito::{Matcher, Server};
    use secrecy::ExposeSecret;
    use url::Url;

    fn setup(provider: &mut StandardProvider, properties: &Properties) {
        provider.setup_credentials("abc", "shh");
        provider.setup_redirect_uri("https://host/cb");
        provider.setup_properties(properties).unwrap();
    }

    #[tokio::test]
    async fn test_start_redirects_to_google_consent_page() {
        let mut provider = new_provider();
        setup(&mut provider, &Properties::new().with(SCOPE_PROPERTY, "profile"));
        provider.configure().unwrap();

        let origin = Url::parse("https://host/dashboard").unwrap();
        let response = provider.start_authentication(&origin).await.unwrap();

        let redirect = response.redirect_uri.unwrap();
        assert_eq!(redirect.host_str(), Some("accounts.google.com"));
        assert_eq!(redirect.path(), "/o/oauth2/v2/auth");
        let query: Vec<(String, String)> = redirect.query_pairs().into_owned().collect();
        assert!(query.contains(&("client_id".to_string(), "abc".to_string())));
        assert!(query.contains(&("scope".to_string(), "profile".to_string())));
        assert!(query.contains(&("redirect_uri".to_string(), "https://host/cb".to_string())));
        assert!(query.contains(&("access_type".to_string(), "online".to_string())));

        assert!(!response.session.is_authenticated());
        assert_eq!(response.session.origin_uri().as_str(), "https://host/dashboard");
    }

    #[tokio::test]
    async fn test_finish_with_mocked_google_endpoints() {
        let mut server = Server::new_async().await;
        let mut provider = new_provider()
            .with_http_client(HttpClientBuilder::new().with_max_retries(0).build().unwrap());
        setup(
            &mut provider,
            &Properties::new()
                .with(SCOPE_PROPERTY, "profile")
                .with("oauth2.google.token_url", format!("{}/token", server.url()))
                .with(
                    "oauth2.google.userinfo_url",
                    format!("{}/oauth2/v1/userinfo?alt=json", server.url()),
                ),
        );
        provider.configure().unwrap();

        let origin = Url::parse("https://host/dashboard").unwrap();
        let pending = provider
            .start_authentication(&origin)
            .await
            .unwrap()
            .session
            .into_pending()
            .unwrap();

        let _token_mock = server
            .mock("POST", "/token")
            .match_body(Matcher::UrlEncoded("code".into(), "4/0Adeu5".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"tok123","expires_in":3599,"token_type":"Bearer"}"#)
            .create_async()
            .await;
        let _userinfo_mock = server
            .mock("GET", "/oauth2/v1/userinfo")
            .match_query(Matcher::UrlEncoded("alt".into(), "json".into()))
            .match_header("authorization", "Bearer tok123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"u42","name":"Test User"}"#)
            .create_async()
            .await;

        let response = provider
            .finish_authentication(&pending, "4/0Adeu5", pending.state(), &sha256_hex)
            .await
            .unwrap();

        assert_eq!(response.redirect_uri.as_ref(), Some(&origin));
        let completed = response.session.into_completed().unwrap();
        assert_eq!(completed.user_identifier(), "u42");
        assert_eq!(completed.access_token().expose_secret(), "tok123");
        assert_eq!(completed.internal_token(), sha256_hex("tok123"));
        assert_eq!(completed.origin_uri(), pending.origin_uri());
    }

    #[test]
    fn test_configure_without_scope_names_the_property() {
        let mut provider = new_provider();
        provider.setup_credentials("abc", "shh");
        provider.setup_redirect_uri("https://host/cb");

        let err = provider.configure().unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Configuration(ConfigurationErrorKind::MissingSetting(
                SCOPE_PROPERTY.to_string()
            ))
        );
        assert!(!provider.is_configured());
    }

    #[test]
    fn test_setup_properties_without_scope_fails() {
        let mut provider = new_provider();
        let err = provider
            .setup_properties(&Properties::new().with("oauth2.google.other", "x"))
            .unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Configuration(ConfigurationErrorKind::MissingSetting(
                SCOPE_PROPERTY.to_string()
            ))
        );
    }

    #[test]
    fn test_configure_is_idempotent() {
        let mut provider = new_provider();
        setup(&mut provider, &Properties::new().with(SCOPE_PROPERTY, "profile"));

        assert!(provider.configure().is_ok());
        assert!(provider.configure().is_ok());
        assert!(provider.is_configured());
    }
}
