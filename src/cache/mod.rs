//! File-backed, expiring read-through cache
//!
//! Slow-changing reference data (teams, labels, workflow states, users) is
//! cached as one JSON file per key:
//!
//! ```text
//! <cache_dir>/agent-linear-cli/<key>.json
//! {"data": <T>, "timestamp": "<RFC3339>"}
//! ```
//!
//! An entry is valid while `now - timestamp <= ttl` (24 hours by default).
//! Corrupt and expired files read as a miss, so the cache heals itself; only
//! storage errors other than "not found" reach the caller.
//!
//! # Example
//!
//! ```no_run
//! use linear_agent_auth::cache::{self, ExpiringCache};
//!
//! # async fn fetch_labels(team: &str) -> linear_agent_auth::Result<Vec<String>> { Ok(vec![]) }
//! # async fn example() -> linear_agent_auth::Result<()> {
//! let cache = ExpiringCache::new()?;
//! let key = cache::team_key("labels", "team-123");
//!
//! let labels: Vec<String> = cache
//!     .get_or_fetch(&key, || fetch_labels("team-123"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

/// Default time-to-live for cache entries (24 hours)
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Directory name under the platform cache home
pub const CACHE_DIR_NAME: &str = "agent-linear-cli";

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// The platform exposes no cache home directory
    #[error("no cache directory available on this platform")]
    NoCacheDir,

    /// I/O error other than a missing entry
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Entry could not be serialized
    #[error("cache JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A cached value with the time it was written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// Cached payload
    pub data: T,
    /// When the payload was written
    pub timestamp: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Whether the entry is still valid at `now`.
    ///
    /// Entries stamped in the future (clock skew) count as fresh.
    #[must_use]
    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match now.signed_duration_since(self.timestamp).to_std() {
            Ok(age) => age <= ttl,
            Err(_) => true,
        }
    }
}

/// Cache key for team-scoped data
#[must_use]
pub fn team_key(resource: &str, team_id: &str) -> String {
    format!("{resource}-team-{team_id}")
}

/// Cache key for workspace-scoped data
#[must_use]
pub fn workspace_key(resource: &str) -> String {
    format!("{resource}-workspace")
}

/// Durable key/value cache with a fixed TTL
#[derive(Debug, Clone)]
pub struct ExpiringCache {
    dir: PathBuf,
    ttl: Duration,
}

impl ExpiringCache {
    /// Create a cache under the platform cache home
    /// (`$XDG_CACHE_HOME` or `~/.cache` on Linux).
    ///
    /// # Errors
    ///
    /// Returns `CacheError::NoCacheDir` if the platform has no cache home.
    pub fn new() -> Result<Self, CacheError> {
        let cache_home = dirs::cache_dir().ok_or(CacheError::NoCacheDir)?;
        Ok(Self::with_dir(cache_home.join(CACHE_DIR_NAME)))
    }

    /// Create a cache rooted at `dir` with the default TTL
    #[must_use]
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ttl: DEFAULT_TTL,
        }
    }

    /// Override the TTL
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Cache root directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Entry time-to-live
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// File backing `key`. Path separators (and `%`, the escape character)
    /// are percent-encoded, so distinct keys map to distinct files that all
    /// sit directly under the cache root.
    #[must_use]
    pub fn key_path(&self, key: &str) -> PathBuf {
        let mut file_name = String::with_capacity(key.len() + ".json".len());
        for c in key.chars() {
            match c {
                '%' => file_name.push_str("%25"),
                '/' => file_name.push_str("%2F"),
                '\\' => file_name.push_str("%5C"),
                c => file_name.push(c),
            }
        }
        file_name.push_str(".json");
        self.dir.join(file_name)
    }

    /// Read a cached value.
    ///
    /// Returns `Ok(None)` when the entry is missing, unreadable as JSON, or
    /// expired. Expired entries are deleted.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Io` for storage failures other than a missing
    /// entry (e.g. permission denied).
    pub async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let path = self.key_path(key);

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(key, "cache miss");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let entry: CacheEntry<T> = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(key, error = %e, "ignoring unreadable cache entry");
                return Ok(None);
            }
        };

        if !entry.is_fresh(self.ttl, Utc::now()) {
            debug!(key, written = %entry.timestamp, "cache entry expired");
            if let Err(e) = fs::remove_file(&path).await {
                debug!(key, error = %e, "failed to remove expired cache entry");
            }
            return Ok(None);
        }

        debug!(key, "cache hit");
        Ok(Some(entry.data))
    }

    /// Store a value stamped with the current time, creating the cache
    /// directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub async fn write<T: Serialize>(&self, key: &str, data: &T) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).await?;

        let entry = CacheEntry {
            data,
            timestamp: Utc::now(),
        };
        let content = serde_json::to_vec_pretty(&entry)?;

        fs::write(self.key_path(key), content).await?;
        Ok(())
    }

    /// Store a value, logging instead of returning a failure.
    ///
    /// Used after a successful fetch: the fetched value is what matters, the
    /// cache copy is only an optimization.
    pub async fn write_best_effort<T: Serialize>(&self, key: &str, data: &T) {
        match self.write(key, data).await {
            Ok(()) => debug!(key, "cache entry written"),
            Err(e) => warn!(key, error = %e, "failed to write cache entry"),
        }
    }

    /// Whether `key` holds a fresh, decodable entry. Storage errors read as
    /// `false`.
    pub async fn has<T: DeserializeOwned>(&self, key: &str) -> bool {
        matches!(self.read::<T>(key).await, Ok(Some(_)))
    }

    /// Delete one entry. A missing entry is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub async fn clear(&self, key: &str) -> Result<(), CacheError> {
        match fs::remove_file(self.key_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every `*.json` entry under the cache root. A missing root is
    /// not an error; other files are left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed or an entry cannot
    /// be removed.
    pub async fn clear_all(&self) -> Result<(), CacheError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0usize;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        debug!(removed, dir = %self.dir.display(), "cache cleared");
        Ok(())
    }

    /// Serve `key` from the cache, or call `fetch` on a miss and cache its
    /// result.
    ///
    /// A hit never calls `fetch`. A failed fetch is propagated and nothing is
    /// written. A failed write after a successful fetch is logged and the
    /// fetched value is still returned.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, or a converted `CacheError` if the cache
    /// could not be read.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.read(key).await? {
            return Ok(cached);
        }

        let data = fetch().await?;
        self.write_best_effort(key, &data).await;
        Ok(data)
    }

    /// Bypass the cache: always call `fetch` and overwrite the entry on
    /// success.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; nothing is written in that case.
    pub async fn refresh<T, E, F, Fut>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let data = fetch().await?;
        self.write_best_effort(key, &data).await;
        Ok(data)
    }
}
