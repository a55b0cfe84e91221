//! Secret storage for Linear credentials
//!
//! The resolver never talks to a vault directly. It is handed an
//! `Arc<dyn SecureStore>` at construction time, picked once at process
//! startup by [`default_store`] (or supplied explicitly by the embedding
//! application and by tests).
//!
//! Four logical secrets live under the [`SERVICE_NAME`] namespace, see
//! [`SecretName`]. The store is a dumb key/value capability: it has no notion
//! of expiry, and deleting a secret that was never written succeeds.

mod file;
#[cfg(feature = "keyring")]
mod vault;
mod memory;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub use file::FileSecretStore;
#[cfg(feature = "keyring")]
pub use vault::KeyringStore;
pub use memory::MemorySecretStore;

/// Service namespace every secret is scoped under
pub const SERVICE_NAME: &str = "agent-linear-cli";

/// Named entries held by a [`SecureStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SecretName {
    /// Personal API key (`lin_api_...`)
    ApiKey,
    /// OAuth application client id
    ClientId,
    /// OAuth application client secret
    ClientSecret,
    /// JSON-encoded [`TokenInfo`](crate::auth::TokenInfo)
    TokenInfo,
}

impl SecretName {
    /// Every secret, in the order logout removes them
    pub const ALL: [SecretName; 4] = [
        SecretName::ApiKey,
        SecretName::TokenInfo,
        SecretName::ClientId,
        SecretName::ClientSecret,
    ];

    /// Storage key for this secret
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SecretName::ApiKey => "api_key",
            SecretName::ClientId => "client_id",
            SecretName::ClientSecret => "client_secret",
            SecretName::TokenInfo => "token_info",
        }
    }
}

impl std::fmt::Display for SecretName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by secret store backends
#[derive(Debug, Error)]
pub enum StoreError {
    /// The vault rejected or failed the operation (locked, unavailable, ...)
    #[error("secret store backend error: {0}")]
    Backend(String),

    /// I/O error in a file-backed store
    #[error("secret store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored payload could not be encoded or decoded
    #[error("secret store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key/value capability over named secrets.
///
/// `get` returns `Ok(None)` when the secret does not exist; any other error
/// means the backend could not answer.
#[async_trait]
pub trait SecureStore: Send + Sync + std::fmt::Debug {
    /// Read a secret
    async fn get(&self, name: SecretName) -> Result<Option<String>, StoreError>;

    /// Create or overwrite a secret
    async fn set(&self, name: SecretName, value: &str) -> Result<(), StoreError>;

    /// Remove a secret. Removing a missing secret is not an error.
    async fn delete(&self, name: SecretName) -> Result<(), StoreError>;

    /// Short label for status output (`keychain`, `file`, ...)
    fn backend_name(&self) -> &'static str;
}

/// Select the platform secret store.
///
/// With the `keyring` feature (default) this is the OS credential vault,
/// otherwise a JSON file under the platform config directory.
#[must_use]
pub fn default_store() -> Arc<dyn SecureStore> {
    #[cfg(feature = "keyring")]
    {
        tracing::debug!(service = SERVICE_NAME, "using OS keyring secret store");
        Arc::new(KeyringStore::new(SERVICE_NAME))
    }

    #[cfg(not(feature = "keyring"))]
    {
        let store = FileSecretStore::new();
        tracing::debug!(path = %store.path().display(), "using file secret store");
        Arc::new(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_names() {
        assert_eq!(SecretName::ApiKey.as_str(), "api_key");
        assert_eq!(SecretName::ClientId.as_str(), "client_id");
        assert_eq!(SecretName::ClientSecret.as_str(), "client_secret");
        assert_eq!(SecretName::TokenInfo.to_string(), "token_info");
    }

    #[test]
    fn test_all_covers_every_secret_once() {
        let mut names = SecretName::ALL.to_vec();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 4);
    }
}
