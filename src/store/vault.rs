//! OS credential vault backend (macOS Keychain, Windows Credential Manager,
//! Linux Secret Service)
//!
//! On Linux the kernel keyutils keyring is in-memory only, so it is used as a
//! cache in front of the Secret Service, which holds the persistent copy.

use async_trait::async_trait;

use super::{SecretName, SecureStore, StoreError};

/// Secret store backed by the platform credential vault.
///
/// Vault calls are blocking, so each one runs on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    /// Create a store scoped to `service`
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    async fn with_entry<T, F>(&self, name: SecretName, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(keyring::Entry) -> Result<T, keyring::Error> + Send + 'static,
    {
        let service = self.service.clone();

        tokio::task::spawn_blocking(move || {
            let entry = keyring::Entry::new(&service, name.as_str()).map_err(backend)?;
            op(entry).map_err(backend)
        })
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?
    }
}

fn backend(err: keyring::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl SecureStore for KeyringStore {
    async fn get(&self, name: SecretName) -> Result<Option<String>, StoreError> {
        self.with_entry(name, |entry| match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e),
        })
        .await
    }

    async fn set(&self, name: SecretName, value: &str) -> Result<(), StoreError> {
        let value = value.to_string();
        self.with_entry(name, move |entry| entry.set_password(&value)).await
    }

    async fn delete(&self, name: SecretName) -> Result<(), StoreError> {
        self.with_entry(name, |entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e),
        })
        .await
    }

    fn backend_name(&self) -> &'static str {
        "keychain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "needs a live OS credential vault"]
    async fn test_vault_round_trip_reads_back_from_a_fresh_store() {
        let service = format!("linear-agent-auth-test-{}", std::process::id());
        let writer = KeyringStore::new(&service);
        writer.set(SecretName::ApiKey, "lin_api_vault").await.unwrap();

        // A second store instance shares no in-process state with the writer
        let reader = KeyringStore::new(&service);
        assert_eq!(
            reader.get(SecretName::ApiKey).await.unwrap().as_deref(),
            Some("lin_api_vault")
        );

        reader.delete(SecretName::ApiKey).await.unwrap();
        reader.delete(SecretName::ApiKey).await.unwrap();
        assert_eq!(reader.get(SecretName::ApiKey).await.unwrap(), None);
    }
}
