//! Defines the error types used across the crate
use core::error::Error;
use core::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Custom error type
pub type BoxedError = Box<dyn Error + Send + Sync>;

/// Everything that can go wrong while building the [`Config`](crate::config::Config)
///
/// All of these are fatal: the program stops before sending any request
#[derive(Debug)]
pub enum ConfigError {
    /// The required configuration file doesn't exist or can't be read
    Unreadable {
        /// Path of the file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// A configuration file is not valid JSON
    Malformed {
        /// Path of the file
        path: PathBuf,
        /// Underlying parsing error
        source: serde_json::Error,
    },
    /// A required value is absent or empty
    Missing(&'static str),
    /// The base URL can't be used to reach gitlab
    InvalidBaseUrl {
        /// The configured value
        value: String,
        /// Why it was rejected
        reason: String,
    },
    /// `ACCEPT_INVALID_CERTS` is set to something else than `yes`
    InvalidAcceptInvalidCerts(String),
}

impl Display for ConfigError {
    #[expect(clippy::absolute_paths, reason = "Use a specific Result type")]
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match *self {
            Self::Unreadable {
                ref path,
                ref source,
            } => write!(f, "can't read {}: {source}", path.display()),
            Self::Malformed {
                ref path,
                ref source,
            } => write!(f, "can't parse {}: {source}", path.display()),
            Self::Missing(key) => write!(f, "{key} is not defined or empty"),
            Self::InvalidBaseUrl {
                ref value,
                ref reason,
            } => write!(f, "invalid base url '{value}': {reason}"),
            Self::InvalidAcceptInvalidCerts(ref value) => write!(
                f,
                "ACCEPT_INVALID_CERTS is set to '{value}' but its only allowed value is 'yes'"
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            Self::Unreadable { ref source, .. } => Some(source),
            Self::Malformed { ref source, .. } => Some(source),
            Self::Missing(_)
            | Self::InvalidBaseUrl { .. }
            | Self::InvalidAcceptInvalidCerts(_) => None,
        }
    }
}
