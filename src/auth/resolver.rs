//! Priority-ordered credential resolution

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::config::{API_KEY_PREFIX, ENV_API_KEY, ENV_CLIENT_ID, EnvCredentials, ResolverConfig};
use super::credential::{AuthMethod, AuthStatus, Credential, CredentialSource};
use super::exchange::{ExchangeError, HttpTokenExchanger, TokenExchanger};
use super::legacy;
use super::token::TokenInfo;
use crate::error::{LinearError, Result};
use crate::store::{SecretName, SecureStore, default_store};

/// Builder for [`CredentialResolver`]
#[derive(Debug, Default)]
pub struct CredentialResolverBuilder {
    config: Option<ResolverConfig>,
    store: Option<Arc<dyn SecureStore>>,
    exchanger: Option<Arc<dyn TokenExchanger>>,
    env: Option<EnvCredentials>,
}

impl CredentialResolverBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom resolver configuration
    #[must_use]
    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the secret store (default: [`default_store`])
    #[must_use]
    pub fn store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the token exchanger (default: HTTP against `config.token_url`)
    #[must_use]
    pub fn exchanger(mut self, exchanger: Arc<dyn TokenExchanger>) -> Self {
        self.exchanger = Some(exchanger);
        self
    }

    /// Set the environment snapshot (default: the process environment)
    #[must_use]
    pub fn env(mut self, env: EnvCredentials) -> Self {
        self.env = Some(env);
        self
    }

    /// Build the resolver
    #[must_use]
    pub fn build(self) -> CredentialResolver {
        let config = self.config.unwrap_or_default();
        let exchanger = self.exchanger.unwrap_or_else(|| {
            Arc::new(HttpTokenExchanger::new(config.token_url.clone())) as Arc<dyn TokenExchanger>
        });

        CredentialResolver {
            store: self.store.unwrap_or_else(default_store),
            env: self.env.unwrap_or_else(EnvCredentials::from_process),
            config,
            exchanger,
        }
    }
}

/// Chooses the credential to present to Linear.
///
/// Sources are tried in a fixed order and the first applicable one wins:
///
/// 1. `LINEAR_API_KEY`
/// 2. `LINEAR_CLIENT_ID` + `LINEAR_CLIENT_SECRET`, exchanged on every call
/// 3. API key in the secret store
/// 4. Exchanged token in the secret store, refreshed from the stored client
///    secret when it is within the refresh buffer of expiring
/// 5. `api_key` in a legacy `.linear.toml`
///
/// Once an exchange is attempted its failure is returned; the resolver does
/// not fall through to lower-priority sources.
#[derive(Debug)]
pub struct CredentialResolver {
    config: ResolverConfig,
    env: EnvCredentials,
    store: Arc<dyn SecureStore>,
    exchanger: Arc<dyn TokenExchanger>,
}

impl CredentialResolver {
    /// Create a resolver for the process environment and the platform store
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self::builder().config(config).build()
    }

    /// Create a builder for custom wiring
    #[must_use]
    pub fn builder() -> CredentialResolverBuilder {
        CredentialResolverBuilder::new()
    }

    /// Get the resolver configuration
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Get the secret store
    #[must_use]
    pub fn store(&self) -> &Arc<dyn SecureStore> {
        &self.store
    }

    /// Resolve the credential to use for the next request.
    ///
    /// # Errors
    ///
    /// - `LinearError::ClientCredentials` if environment client credentials
    ///   could not be exchanged
    /// - `LinearError::RefreshFailed` if a stale stored token could not be
    ///   refreshed
    /// - `LinearError::Cancelled` if `cancel` fired during an exchange
    /// - `LinearError::NotAuthenticated` if no source is configured
    pub async fn resolve(&self, cancel: &CancellationToken) -> Result<Credential> {
        if let Some(key) = self.env.static_key() {
            debug!(source = ENV_API_KEY, "using API key from environment");
            return Ok(Credential::static_key(key, CredentialSource::Environment));
        }

        if let Some((client_id, client_secret)) = self.env.client_credentials() {
            debug!(source = ENV_CLIENT_ID, "exchanging client credentials from environment");
            let token = self
                .exchanger
                .exchange(client_id, client_secret, cancel)
                .await
                .map_err(|e| exchange_failure(e, LinearError::ClientCredentials))?;
            return Ok(Credential::from_token(token, CredentialSource::Environment));
        }

        if let Some(key) = self.stored_secret(SecretName::ApiKey).await {
            debug!("using API key from secret store");
            return Ok(Credential::static_key(key, CredentialSource::SecureStore));
        }

        if let Some(token) = self.stored_token().await {
            if token.is_fresh(self.config.refresh_buffer) {
                debug!(expires_at = %token.expires_at, "using stored access token");
                return Ok(Credential::from_token(token, CredentialSource::SecureStore));
            }

            if let Some(client_secret) = self.stored_secret(SecretName::ClientSecret).await {
                let client_id = self
                    .stored_secret(SecretName::ClientId)
                    .await
                    .unwrap_or_else(|| self.config.default_client_id.clone());

                debug!(expires_at = %token.expires_at, "refreshing stored access token");
                let refreshed = self
                    .exchanger
                    .exchange(&client_id, &client_secret, cancel)
                    .await
                    .map_err(|e| exchange_failure(e, LinearError::RefreshFailed))?;

                self.persist_token(&refreshed).await;
                return Ok(Credential::from_token(refreshed, CredentialSource::SecureStore));
            }

            debug!("stored access token is stale and no client secret is stored");
        }

        if let Some((key, path)) = legacy::find_api_key(&self.config.legacy_config_paths).await {
            debug!(path = %path.display(), "using API key from legacy config file");
            return Ok(Credential::static_key(key, CredentialSource::LegacyFile));
        }

        Err(LinearError::NotAuthenticated)
    }

    /// Resolve and return only the bearer value
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub async fn token(&self, cancel: &CancellationToken) -> Result<String> {
        Ok(self.resolve(cancel).await?.into_value())
    }

    /// Report which credential [`resolve`](Self::resolve) would use, without
    /// network calls or writes.
    ///
    /// A stale stored token counts as available only if it can be refreshed.
    pub async fn status(&self) -> AuthStatus {
        if self.env.static_key().is_some() {
            return AuthStatus::available(
                AuthMethod::StaticKey,
                CredentialSource::Environment,
                format!("env:{ENV_API_KEY}"),
                None,
            );
        }

        if self.env.client_credentials().is_some() {
            return AuthStatus::available(
                AuthMethod::ExchangedToken,
                CredentialSource::Environment,
                format!("env:{ENV_CLIENT_ID}"),
                None,
            );
        }

        let backend = self.store.backend_name();

        if self.stored_secret(SecretName::ApiKey).await.is_some() {
            return AuthStatus::available(
                AuthMethod::StaticKey,
                CredentialSource::SecureStore,
                backend,
                None,
            );
        }

        if let Some(token) = self.stored_token().await {
            let usable = token.is_fresh(self.config.refresh_buffer)
                || self.stored_secret(SecretName::ClientSecret).await.is_some();
            if usable {
                return AuthStatus::available(
                    AuthMethod::ExchangedToken,
                    CredentialSource::SecureStore,
                    backend,
                    Some(token.expires_at),
                );
            }
        }

        if let Some((_, path)) = legacy::find_api_key(&self.config.legacy_config_paths).await {
            return AuthStatus::available(
                AuthMethod::StaticKey,
                CredentialSource::LegacyFile,
                path.display().to_string(),
                None,
            );
        }

        AuthStatus::unauthenticated()
    }

    /// Store a personal API key.
    ///
    /// The `lin_api_` prefix is checked here only; resolution trusts whatever
    /// is stored and leaves rejection to the API.
    ///
    /// # Errors
    ///
    /// Returns `LinearError::InvalidApiKey` for empty or malformed keys, or
    /// `LinearError::Store` if the key cannot be saved.
    pub async fn login_with_api_key(&self, api_key: &str) -> Result<()> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(LinearError::invalid_api_key("API key cannot be empty"));
        }
        if !api_key.starts_with(API_KEY_PREFIX) {
            return Err(LinearError::invalid_api_key(format!(
                "should start with '{API_KEY_PREFIX}'"
            )));
        }

        self.store.set(SecretName::ApiKey, api_key).await?;
        debug!("API key stored");
        Ok(())
    }

    /// Validate client credentials with one exchange, then store them along
    /// with the fresh token.
    ///
    /// An empty `client_id` selects the configured default client id.
    ///
    /// # Errors
    ///
    /// Returns `LinearError::InvalidCredentials` if the exchange fails,
    /// `LinearError::InvalidConfig` for an empty secret, or
    /// `LinearError::Store` if the credentials cannot be saved.
    pub async fn login_with_client_credentials(
        &self,
        client_id: &str,
        client_secret: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let client_secret = client_secret.trim();
        if client_secret.is_empty() {
            return Err(LinearError::invalid_config("client secret cannot be empty"));
        }
        let client_id = match client_id.trim() {
            "" => self.config.default_client_id.as_str(),
            id => id,
        };

        let token = self
            .exchanger
            .exchange(client_id, client_secret, cancel)
            .await
            .map_err(|e| exchange_failure(e, LinearError::InvalidCredentials))?;

        self.store.set(SecretName::ClientId, client_id).await?;
        self.store.set(SecretName::ClientSecret, client_secret).await?;
        self.persist_token(&token).await;

        debug!(client_id, "client credentials stored");
        Ok(())
    }

    /// Remove every stored secret.
    ///
    /// All four deletions are attempted even if some fail. Environment
    /// variables are untouched.
    ///
    /// # Errors
    ///
    /// Returns `LinearError::Logout` listing each secret that could not be
    /// removed.
    pub async fn logout(&self) -> Result<()> {
        let mut failures = Vec::new();

        for name in SecretName::ALL {
            if let Err(e) = self.store.delete(name).await {
                warn!(secret = %name, error = %e, "failed to delete secret");
                failures.push((name, e));
            }
        }

        if failures.is_empty() {
            debug!("all stored credentials removed");
            Ok(())
        } else {
            Err(LinearError::Logout { failures })
        }
    }

    /// Read a non-empty secret. A failing backend reads as absent so one
    /// locked entry cannot hide lower-priority sources.
    async fn stored_secret(&self, name: SecretName) -> Option<String> {
        match self.store.get(name).await {
            Ok(value) => value.filter(|value| !value.is_empty()),
            Err(e) => {
                warn!(secret = %name, error = %e, "secret store read failed, treating as absent");
                None
            }
        }
    }

    async fn stored_token(&self) -> Option<TokenInfo> {
        let raw = self.stored_secret(SecretName::TokenInfo).await?;
        match serde_json::from_str(&raw) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!(error = %e, "stored token is unreadable, ignoring it");
                None
            }
        }
    }

    /// Save a freshly exchanged token. Failure is logged and swallowed: the
    /// in-memory token is still good for this call.
    async fn persist_token(&self, token: &TokenInfo) {
        let outcome = match serde_json::to_string(token) {
            Ok(json) => self.store.set(SecretName::TokenInfo, &json).await,
            Err(e) => Err(e.into()),
        };

        match outcome {
            Ok(()) => debug!(expires_at = %token.expires_at, "access token cached"),
            Err(e) => warn!(error = %e, "failed to cache access token"),
        }
    }
}

fn exchange_failure(err: ExchangeError, wrap: fn(ExchangeError) -> LinearError) -> LinearError {
    match err {
        ExchangeError::Cancelled => LinearError::Cancelled,
        other => wrap(other),
    }
}
