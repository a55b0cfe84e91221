//! Resolved credentials and authentication status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::token::TokenInfo;
use crate::utils::mask_secret;

/// How a credential authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthMethod {
    /// No credential available
    #[serde(rename = "none")]
    None,
    /// Long-lived personal API key
    #[serde(rename = "api_key")]
    StaticKey,
    /// Short-lived token from the client-credentials grant
    #[serde(rename = "client_credentials")]
    ExchangedToken,
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuthMethod::None => "none",
            AuthMethod::StaticKey => "api_key",
            AuthMethod::ExchangedToken => "client_credentials",
        })
    }
}

/// Where a credential came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    /// Process environment variables
    Environment,
    /// The injected secret store
    SecureStore,
    /// `api_key` in a legacy `.linear.toml`
    LegacyFile,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CredentialSource::Environment => "environment",
            CredentialSource::SecureStore => "secure_store",
            CredentialSource::LegacyFile => "legacy_file",
        })
    }
}

/// A bearer value ready to put on an outbound request.
///
/// Exchanged tokens always carry an expiry, static keys never do; the
/// constructors are the only way to build one.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    value: String,
    method: AuthMethod,
    source: CredentialSource,
    expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// A non-expiring personal API key
    pub fn static_key(value: impl Into<String>, source: CredentialSource) -> Self {
        Self {
            value: value.into(),
            method: AuthMethod::StaticKey,
            source,
            expires_at: None,
        }
    }

    /// An exchanged access token valid until `expires_at`
    pub fn exchanged(
        value: impl Into<String>,
        source: CredentialSource,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            value: value.into(),
            method: AuthMethod::ExchangedToken,
            source,
            expires_at: Some(expires_at),
        }
    }

    pub(crate) fn from_token(token: TokenInfo, source: CredentialSource) -> Self {
        Self::exchanged(token.access_token, source, token.expires_at)
    }

    /// The raw bearer value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Consume the credential, returning the raw bearer value
    #[must_use]
    pub fn into_value(self) -> String {
        self.value
    }

    /// Authentication method
    #[must_use]
    pub fn method(&self) -> AuthMethod {
        self.method
    }

    /// Provenance
    #[must_use]
    pub fn source(&self) -> CredentialSource {
        self.source
    }

    /// Expiry, present only for exchanged tokens
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// `Authorization` header value. Linear takes personal API keys bare and
    /// OAuth tokens with the `Bearer` scheme.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        match self.method {
            AuthMethod::ExchangedToken => format!("Bearer {}", self.value),
            AuthMethod::StaticKey | AuthMethod::None => self.value.clone(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("value", &mask_secret(&self.value))
            .field("method", &self.method)
            .field("source", &self.source)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Side-effect-free report of which credential would be used
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthStatus {
    /// Whether a usable credential appears to be available
    pub authenticated: bool,
    /// Method the credential would use
    pub method: AuthMethod,
    /// Provenance of the credential
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<CredentialSource>,
    /// Human label for the origin (`env:LINEAR_API_KEY`, `keychain`, a file
    /// path, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Expiry of a stored exchanged token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthStatus {
    pub(crate) fn unauthenticated() -> Self {
        Self {
            authenticated: false,
            method: AuthMethod::None,
            source: None,
            origin: None,
            expires_at: None,
        }
    }

    pub(crate) fn available(
        method: AuthMethod,
        source: CredentialSource,
        origin: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            authenticated: true,
            method,
            source: Some(source),
            origin: Some(origin.into()),
            expires_at,
        }
    }
}
