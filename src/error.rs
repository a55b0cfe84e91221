//! Error types for credential resolution and caching
//!
//! Every [`LinearError`] carries a stable machine-readable [`code`] and,
//! where one exists, a remediating command in [`hint`]. The consuming CLI is
//! driven by agents as often as by people, so [`ErrorReport`] packages both
//! next to the message for JSON output.
//!
//! [`code`]: LinearError::code
//! [`hint`]: LinearError::hint

use serde::Serialize;
use thiserror::Error;

use crate::auth::ExchangeError;
use crate::cache::CacheError;
use crate::store::{SecretName, StoreError};

/// Main error type for the credential and cache core
#[derive(Error, Debug)]
pub enum LinearError {
    /// No credential source is configured
    #[error(
        "not authenticated: run 'linear auth login' or set LINEAR_API_KEY (get key from https://linear.app/settings/api)"
    )]
    NotAuthenticated,

    /// Client credentials from the environment were rejected or unreachable
    #[error("client credentials auth failed: {0}")]
    ClientCredentials(#[source] ExchangeError),

    /// A stored token was stale and could not be refreshed
    #[error("token refresh failed: {0}")]
    RefreshFailed(#[source] ExchangeError),

    /// Client credentials offered at login were rejected
    #[error("invalid credentials: {0}")]
    InvalidCredentials(#[source] ExchangeError),

    /// API key offered at login has the wrong shape
    #[error("invalid API key format: {0}")]
    InvalidApiKey(String),

    /// Invalid input or configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Logout removed what it could but some secrets remain
    #[error("logout completed with errors: {}", describe_failures(.failures))]
    Logout {
        /// Secrets that could not be deleted, with the reason
        failures: Vec<(SecretName, StoreError)>,
    },

    /// Secret store failure on an operation that needs it
    #[error("Secret store error: {0}")]
    Store(#[from] StoreError),

    /// Cache storage failure
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// The caller cancelled an in-flight request
    #[error("operation cancelled")]
    Cancelled,
}

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, LinearError>;

fn describe_failures(failures: &[(SecretName, StoreError)]) -> String {
    failures
        .iter()
        .map(|(name, err)| format!("{name}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl LinearError {
    /// Create an invalid API key error
    pub fn invalid_api_key(msg: impl Into<String>) -> Self {
        Self::InvalidApiKey(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Stable classification for programmatic handling
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::ClientCredentials(_) => "CLIENT_CREDENTIALS_FAILED",
            Self::RefreshFailed(_) => "REFRESH_FAILED",
            Self::InvalidCredentials(_) => "INVALID_CREDENTIALS",
            Self::InvalidApiKey(_) => "INVALID_API_KEY",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Logout { .. } => "LOGOUT_PARTIAL",
            Self::Store(_) => "STORE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Command that should resolve the error, if any
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotAuthenticated => Some("linear auth login"),
            Self::ClientCredentials(_) => Some("unset LINEAR_CLIENT_ID LINEAR_CLIENT_SECRET"),
            Self::RefreshFailed(_) => Some("linear auth login --client-credentials"),
            Self::InvalidCredentials(_) => Some("linear auth login --client-credentials"),
            Self::InvalidApiKey(_) => Some("linear auth login --with-token"),
            Self::Logout { .. } => Some("linear auth logout"),
            Self::Store(_) => Some("unlock the system keychain and retry"),
            Self::Cache(_) => Some("linear cache clear"),
            Self::InvalidConfig(_) | Self::Cancelled => None,
        }
    }

    /// Terminal errors must be surfaced as-is and are never retried
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::NotAuthenticated
                | Self::ClientCredentials(_)
                | Self::RefreshFailed(_)
                | Self::InvalidCredentials(_)
        )
    }

    /// Message, code and hint bundled for structured output
    #[must_use]
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code(),
            message: self.to_string(),
            hint: self.hint(),
        }
    }
}

/// Serializable view of a [`LinearError`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    /// Machine-readable classification
    pub code: &'static str,
    /// Human-readable message
    pub message: String,
    /// Suggested remediating command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}
