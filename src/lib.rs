//! # Linear Agent Auth
//!
//! Credential resolution and local response caching for a Linear CLI that is
//! driven by agents as well as people. Async, strongly typed, tokio-based.
//!
//! ## Quick Start
//!
//! Resolve the credential for the next request with [`CredentialResolver`]:
//!
//! ```no_run
//! use linear_agent_auth::{CredentialResolver, ResolverConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = CredentialResolver::new(ResolverConfig::default());
//!     let cancel = CancellationToken::new();
//!
//!     let credential = resolver.resolve(&cancel).await?;
//!     println!("Authorization: {}", credential.authorization_header());
//!     Ok(())
//! }
//! ```
//!
//! ## Core Features
//!
//! ### 1. Credential resolution
//!
//! Environment variables win over stored secrets, static keys win over
//! exchanged tokens, and a stored token close to expiry is refreshed from the
//! stored client secret before it is handed out. See the [`auth`] module.
//!
//! ### 2. Status without side effects
//!
//! ```no_run
//! # use linear_agent_auth::{CredentialResolver, ResolverConfig};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = CredentialResolver::new(ResolverConfig::default());
//! let status = resolver.status().await;
//! println!("{}", serde_json::to_string_pretty(&status)?);
//! # Ok(())
//! # }
//! ```
//!
//! ### 3. Response cache
//!
//! [`ExpiringCache`] keeps slow-changing lookups (teams, workflow states,
//! labels) on disk for 24 hours:
//!
//! ```no_run
//! # use linear_agent_auth::{ExpiringCache, LinearError};
//! # use linear_agent_auth::cache::team_key;
//! # async fn example() -> Result<(), LinearError> {
//! let cache = ExpiringCache::new()?;
//! let states: Vec<String> = cache
//!     .get_or_fetch(&team_key("states", "ENG"), || async {
//!         Ok::<_, LinearError>(vec!["Todo".to_string(), "Done".to_string()])
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`auth`]: Priority chain, token exchange, login and logout
//! - [`store`]: Secret store capability and its backends
//! - [`cache`]: File-backed TTL cache
//! - [`error`]: Error types with stable codes and hints
//! - [`utils`]: String helpers for logging secrets safely
//!
//! ## Feature Flags
//!
//! - `keyring` (default) - Platform keychain backend via the
//!   [keyring](https://crates.io/crates/keyring) crate. Without it secrets
//!   are kept in a user-only JSON file.
//!
//! ## Logging
//!
//! This crate uses [`tracing`](https://crates.io/crates/tracing) for structured logging.
//! Tracing events are always emitted but are zero-cost when no subscriber is attached.
//! Secret values are never logged. To see logs, attach a tracing subscriber in your
//! application:
//!
//! ```rust,ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, LinearError>`](Result). Each
//! error maps to a stable code and, where one exists, a command that fixes it:
//!
//! ```no_run
//! # use linear_agent_auth::{CredentialResolver, LinearError, ResolverConfig};
//! # use tokio_util::sync::CancellationToken;
//! # async fn example() {
//! let resolver = CredentialResolver::new(ResolverConfig::default());
//! match resolver.token(&CancellationToken::new()).await {
//!     Ok(token) => { /* ... */ }
//!     Err(e) => {
//!         let report = e.report();
//!         eprintln!("{}: {}", report.code, report.message);
//!     }
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod cache;
pub mod error;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use auth::{
    AuthMethod, AuthStatus, Credential, CredentialResolver, CredentialResolverBuilder,
    CredentialSource, EnvCredentials, ResolverConfig, TokenInfo,
};
pub use cache::ExpiringCache;
pub use error::{ErrorReport, LinearError, Result};
pub use store::{SecretName, SecureStore, default_store};

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
