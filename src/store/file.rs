//! JSON file secret store for hosts without a usable OS vault

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use super::{SERVICE_NAME, SecretName, SecureStore, StoreError};

type SecretFile = BTreeMap<String, String>;

/// Secret store persisting every secret in one JSON object.
///
/// The file is written atomically (temp file + rename) with user-only
/// permissions (600) on Unix.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    storage_path: PathBuf,
}

impl Default for FileSecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSecretStore {
    /// Create a store at the default path (platform-specific config directory)
    #[must_use]
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(SERVICE_NAME);

        Self {
            storage_path: config_dir.join("credentials.json"),
        }
    }

    /// Create a store with a custom path
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            storage_path: path.into(),
        }
    }

    /// Get the storage path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    async fn read_all(&self) -> Result<SecretFile, StoreError> {
        match fs::read_to_string(&self.storage_path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SecretFile::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Contents to modify before a write. An undecodable file is replaced
    /// rather than blocking every later login and logout.
    async fn read_for_update(&self) -> Result<SecretFile, StoreError> {
        match self.read_all().await {
            Err(StoreError::Json(e)) => {
                warn!(
                    path = %self.storage_path.display(),
                    error = %e,
                    "secret file is corrupt, overwriting it"
                );
                Ok(SecretFile::new())
            }
            other => other,
        }
    }

    async fn write_all(&self, secrets: &SecretFile) -> Result<(), StoreError> {
        if let Some(parent) = self.storage_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(secrets)?;

        // A leftover temp file may carry looser permissions; start fresh so
        // the mode below applies at creation.
        let temp_path = self.storage_path.with_extension("tmp");
        match fs::remove_file(&temp_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&temp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.storage_path).await?;
        Ok(())
    }
}

#[async_trait]
impl SecureStore for FileSecretStore {
    async fn get(&self, name: SecretName) -> Result<Option<String>, StoreError> {
        Ok(self.read_all().await?.remove(name.as_str()))
    }

    async fn set(&self, name: SecretName, value: &str) -> Result<(), StoreError> {
        let mut secrets = self.read_for_update().await?;
        secrets.insert(name.as_str().to_string(), value.to_string());
        self.write_all(&secrets).await
    }

    async fn delete(&self, name: SecretName) -> Result<(), StoreError> {
        let mut secrets = match self.read_all().await {
            Ok(secrets) => secrets,
            Err(StoreError::Json(_)) => {
                // Nothing in a corrupt file can be recovered; drop it whole
                warn!(path = %self.storage_path.display(), "removing corrupt secret file");
                return match fs::remove_file(&self.storage_path).await {
                    Ok(()) => Ok(()),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                    Err(e) => Err(e.into()),
                };
            }
            Err(e) => return Err(e),
        };
        if secrets.remove(name.as_str()).is_none() {
            return Ok(());
        }
        self.write_all(&secrets).await
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_store_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSecretStore::with_path(temp_dir.path().join("nested").join("creds.json"));

        store.set(SecretName::ClientId, "client-1").await.unwrap();
        store.set(SecretName::ClientSecret, "s3cret").await.unwrap();

        assert_eq!(
            store.get(SecretName::ClientId).await.unwrap().as_deref(),
            Some("client-1")
        );
        assert_eq!(
            store.get(SecretName::ClientSecret).await.unwrap().as_deref(),
            Some("s3cret")
        );
        assert!(store.get(SecretName::ApiKey).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSecretStore::with_path(temp_dir.path().join("nonexistent.json"));

        assert!(store.get(SecretName::TokenInfo).await.unwrap().is_none());
        store.delete(SecretName::TokenInfo).await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_file_store_delete_keeps_other_secrets() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSecretStore::with_path(temp_dir.path().join("creds.json"));

        store.set(SecretName::ApiKey, "lin_api_abc").await.unwrap();
        store.set(SecretName::ClientId, "client-1").await.unwrap();
        store.delete(SecretName::ApiKey).await.unwrap();

        assert!(store.get(SecretName::ApiKey).await.unwrap().is_none());
        assert!(store.get(SecretName::ClientId).await.unwrap().is_some());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_store_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let store = FileSecretStore::with_path(temp_dir.path().join("creds.json"));
        store.set(SecretName::ApiKey, "lin_api_abc").await.unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("creds.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileSecretStore::with_path(path);
        assert!(matches!(
            store.get(SecretName::ApiKey).await,
            Err(StoreError::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_does_not_block_logout_or_login() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("creds.json");
        std::fs::write(&path, "{trunc").unwrap();
        let store = FileSecretStore::with_path(&path);

        for name in SecretName::ALL {
            store.delete(name).await.unwrap();
        }
        assert!(!path.exists());

        std::fs::write(&path, "{trunc").unwrap();
        store.set(SecretName::ApiKey, "lin_api_good").await.unwrap();
        assert_eq!(
            store.get(SecretName::ApiKey).await.unwrap().as_deref(),
            Some("lin_api_good")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_store_replaces_loose_temp_file() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("creds.json");
        let stale = path.with_extension("tmp");
        std::fs::write(&stale, "leftover").unwrap();
        std::fs::set_permissions(&stale, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = FileSecretStore::with_path(&path);
        store.set(SecretName::ClientSecret, "s3cret").await.unwrap();

        assert!(!stale.exists());
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
