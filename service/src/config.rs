use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use oauth_session::error::{invalid_setting, Error};
use oauth_session::oauth::Properties;
use std::fs;
use std::path::PathBuf;

/// Default callback the Google provider redirects to after consent.
pub const DEFAULT_GOOGLE_REDIRECT_URI: &str = "http://localhost:4000/oauth/google/callback";

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The OAuth client ID issued by the Google Cloud console.
    #[arg(long, env)]
    google_client_id: Option<String>,

    /// The OAuth client secret issued by the Google Cloud console.
    #[arg(long, env, hide_env_values = true)]
    google_client_secret: Option<String>,

    /// The callback URI registered with Google for this application.
    #[arg(long, env, default_value = DEFAULT_GOOGLE_REDIRECT_URI)]
    google_redirect_uri: String,

    /// The client ID for a generic OpenID Connect provider. The provider is only
    /// enabled when this is set.
    #[arg(long, env)]
    oidc_client_id: Option<String>,

    /// The client secret for the OpenID Connect provider.
    #[arg(long, env, hide_env_values = true)]
    oidc_client_secret: Option<String>,

    /// The callback URI registered with the OpenID Connect provider.
    #[arg(long, env)]
    oidc_redirect_uri: Option<String>,

    /// Provider properties as a comma separated list of key=value pairs,
    /// e.g. "oauth2.google.scope=profile email". These override the file.
    #[arg(long, env, value_delimiter = ',', use_value_delimiter = true)]
    oauth_properties: Vec<String>,

    /// Path to a properties file with one key=value provider property per line.
    #[arg(long, env)]
    oauth_properties_file: Option<PathBuf>,

    /// Timeout in seconds for requests to provider token and user info endpoints
    #[arg(long, env, default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Maximum number of retries for transient user info failures. The token
    /// exchange is never retried since authorization codes are single use.
    #[arg(long, env, default_value_t = 3)]
    pub http_max_retries: u32,

    /// The page to return to once the login started by the CLI completes.
    #[arg(long, env, default_value = "http://localhost:4000/")]
    origin_uri: String,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .try_map(|s| s.parse::<LevelFilter>()),
        )]
    pub log_level_filter: LevelFilter,
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn google_client_id(&self) -> Option<&str> {
        self.google_client_id.as_deref()
    }

    pub fn google_client_secret(&self) -> Option<&str> {
        self.google_client_secret.as_deref()
    }

    pub fn google_redirect_uri(&self) -> &str {
        &self.google_redirect_uri
    }

    pub fn oidc_client_id(&self) -> Option<&str> {
        self.oidc_client_id.as_deref()
    }

    pub fn oidc_client_secret(&self) -> Option<&str> {
        self.oidc_client_secret.as_deref()
    }

    pub fn oidc_redirect_uri(&self) -> Option<&str> {
        self.oidc_redirect_uri.as_deref()
    }

    pub fn origin_uri(&self) -> &str {
        &self.origin_uri
    }

    /// Provider properties: the properties file, overlaid with the inline pairs.
    pub fn properties(&self) -> Result<Properties, Error> {
        let from_file = match &self.oauth_properties_file {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|e| {
                    invalid_setting(
                        "oauth_properties_file",
                        &format!("{}: {}", path.display(), e),
                    )
                })?;
                Properties::parse(&text)?
            }
            None => Properties::new(),
        };
        let inline = Properties::from_pairs(
            self.oauth_properties
                .iter()
                .filter(|pair| !pair.trim().is_empty()),
        )?;

        Ok(from_file.merge(inline))
    }
}
