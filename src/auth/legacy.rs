//! Read-only support for the `api_key` entry of the old `.linear.toml`
//! config file

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the legacy config
pub const LEGACY_CONFIG_FILE: &str = ".linear.toml";

#[derive(Debug, Default, Deserialize)]
struct LegacyConfig {
    #[serde(default)]
    api_key: Option<String>,
}

/// Project-local file first, then the one in the home directory
#[must_use]
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LEGACY_CONFIG_FILE)];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(LEGACY_CONFIG_FILE));
    }
    paths
}

/// First non-empty `api_key` found in `paths`, with the file it came from.
///
/// Missing, unreadable and malformed files are skipped.
pub(crate) async fn find_api_key(paths: &[PathBuf]) -> Option<(String, PathBuf)> {
    for path in paths {
        if let Some(key) = read_api_key(path).await {
            return Some((key, path.clone()));
        }
    }
    None
}

async fn read_api_key(path: &Path) -> Option<String> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                debug!(path = %path.display(), error = %e, "skipping unreadable legacy config");
            }
            return None;
        }
    };

    match toml::from_str::<LegacyConfig>(&content) {
        Ok(config) => config.api_key.filter(|key| !key.trim().is_empty()),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "skipping malformed legacy config");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_api_key_and_ignores_other_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(LEGACY_CONFIG_FILE);
        std::fs::write(
            &path,
            "api_key = \"lin_api_legacy\"\nteam_key = \"ENG\"\nteam_id = \"t-1\"\n",
        )
        .unwrap();

        let found = find_api_key(std::slice::from_ref(&path)).await;
        assert_eq!(found, Some(("lin_api_legacy".to_string(), path)));
    }

    #[tokio::test]
    async fn test_skips_missing_malformed_and_empty_files() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        let malformed = temp_dir.path().join("malformed.toml");
        let empty_key = temp_dir.path().join("empty.toml");
        let good = temp_dir.path().join("good.toml");
        std::fs::write(&malformed, "api_key = ").unwrap();
        std::fs::write(&empty_key, "api_key = \"\"").unwrap();
        std::fs::write(&good, "api_key = \"lin_api_second\"").unwrap();

        let found = find_api_key(&[missing, malformed, empty_key, good.clone()]).await;
        assert_eq!(found, Some(("lin_api_second".to_string(), good)));
    }

    #[tokio::test]
    async fn test_no_paths() {
        assert!(find_api_key(&[]).await.is_none());
    }

    #[test]
    fn test_default_paths_start_with_local_file() {
        let paths = default_paths();
        assert_eq!(paths[0], PathBuf::from(LEGACY_CONFIG_FILE));
    }
}
