use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{SecretName, SecureStore, StoreError};

/// In-memory secret store for tests and embedders that manage persistence
/// themselves.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: RwLock<HashMap<SecretName, String>>,
}

impl MemorySecretStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of secrets currently held
    pub async fn len(&self) -> usize {
        self.secrets.read().await.len()
    }

    /// True when no secret is held
    pub async fn is_empty(&self) -> bool {
        self.secrets.read().await.is_empty()
    }
}

#[async_trait]
impl SecureStore for MemorySecretStore {
    async fn get(&self, name: SecretName) -> Result<Option<String>, StoreError> {
        Ok(self.secrets.read().await.get(&name).cloned())
    }

    async fn set(&self, name: SecretName, value: &str) -> Result<(), StoreError> {
        self.secrets.write().await.insert(name, value.to_string());
        Ok(())
    }

    async fn delete(&self, name: SecretName) -> Result<(), StoreError> {
        self.secrets.write().await.remove(&name);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
