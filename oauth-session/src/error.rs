//! Error types for the `oauth-session` crate.
//!
//! A root Error struct carries an error kind and an optional source for chaining.
//! Callers only ever see two categories: configuration failures and flow failures.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for oauth-session crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in oauth-session.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Configuration(ConfigurationErrorKind),
    Flow(FlowErrorKind),
}

/// Errors raised while setting up or validating a provider.
#[derive(Debug, PartialEq)]
pub enum ConfigurationErrorKind {
    /// A required setting was never supplied. Carries the setting name.
    MissingSetting(String),
    /// A setting was supplied but could not be used. Carries the setting name.
    InvalidSetting(String),
    /// A flow operation was attempted before `configure()` succeeded.
    NotConfigured,
}

/// Errors raised while running an authentication flow.
#[derive(Debug, PartialEq)]
pub enum FlowErrorKind {
    /// The callback `state` does not match the one issued at flow start.
    InvalidState,
    /// The pending session outlived its lifetime before the callback arrived.
    SessionExpired,
    /// No pending session matches the callback (never issued or already used).
    UnknownSession,
    /// The callback reached a different provider than the one that started the flow.
    ProviderMismatch,
    TokenExchangeFailed,
    UserInfoFailed,
    InvalidResponse,
    Network,
}

impl Error {
    /// True for failures raised by provider setup or validation.
    pub fn is_configuration(&self) -> bool {
        matches!(self.error_kind, ErrorKind::Configuration(_))
    }

    /// True for failures raised while a flow was running.
    pub fn is_flow(&self) -> bool {
        matches!(self.error_kind, ErrorKind::Flow(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Configuration(ConfigurationErrorKind::MissingSetting(name)) => {
                write!(f, "Configuration error: missing setting '{}'", name)
            }
            ErrorKind::Configuration(ConfigurationErrorKind::InvalidSetting(name)) => {
                write!(f, "Configuration error: invalid setting '{}'", name)
            }
            ErrorKind::Configuration(kind) => write!(f, "Configuration error: {:?}", kind),
            ErrorKind::Flow(kind) => match &self.source {
                Some(source) => write!(f, "OAuth flow error: {:?}: {}", kind, source),
                None => write!(f, "OAuth flow error: {:?}", kind),
            },
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_decode() {
            ErrorKind::Flow(FlowErrorKind::InvalidResponse)
        } else {
            ErrorKind::Flow(FlowErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Flow(FlowErrorKind::Network),
        }
    }
}

/// Helper function to create configuration errors.
pub fn configuration_error(kind: ConfigurationErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Configuration(kind),
    }
}

/// Helper function to create a configuration error for a setting that was never supplied.
pub fn missing_setting(name: &str) -> Error {
    configuration_error(
        ConfigurationErrorKind::MissingSetting(name.to_string()),
        &format!("{} is required", name),
    )
}

/// Helper function to create a configuration error for a malformed setting.
pub fn invalid_setting(name: &str, message: &str) -> Error {
    configuration_error(
        ConfigurationErrorKind::InvalidSetting(name.to_string()),
        message,
    )
}

/// Helper function to create flow errors.
pub fn flow_error(kind: FlowErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Flow(kind),
    }
}
