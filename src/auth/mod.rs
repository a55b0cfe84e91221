//! Credential resolution for the Linear API
//!
//! # Overview
//!
//! [`CredentialResolver`] walks a fixed priority chain and returns the first
//! credential it finds:
//!
//! 1. `LINEAR_API_KEY` from the environment
//! 2. `LINEAR_CLIENT_ID` and `LINEAR_CLIENT_SECRET`, exchanged for a token
//! 3. A personal API key in the secret store
//! 4. A stored exchanged token, refreshed when it is within five minutes of
//!    expiry
//! 5. `api_key` from a legacy `.linear.toml`
//!
//! # Example
//!
//! ```no_run
//! use linear_agent_auth::auth::{CredentialResolver, ResolverConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = CredentialResolver::new(ResolverConfig::default());
//!
//!     let credential = resolver.resolve(&CancellationToken::new()).await?;
//!     println!("using {} from {}", credential.method(), credential.source());
//!     Ok(())
//! }
//! ```
//!
//! # Storage
//!
//! Secrets live in the platform keychain when the `keyring` feature is
//! enabled, otherwise in a user-only JSON file under the config directory.
//! Any [`SecureStore`](crate::store::SecureStore) can be injected through
//! [`CredentialResolverBuilder::store`].

mod config;
mod credential;
mod exchange;
pub mod legacy;
mod resolver;
mod token;

pub use config::{
    API_KEY_PREFIX, DEFAULT_CLIENT_ID, ENV_API_KEY, ENV_CLIENT_ID, ENV_CLIENT_SECRET,
    EnvCredentials, LINEAR_TOKEN_ENDPOINT, ResolverConfig, ResolverConfigBuilder,
    TOKEN_EXPIRY_BUFFER,
};
pub use credential::{AuthMethod, AuthStatus, Credential, CredentialSource};
pub use exchange::{ExchangeError, HttpTokenExchanger, TokenExchanger};
pub use resolver::{CredentialResolver, CredentialResolverBuilder};
pub use token::TokenInfo;
