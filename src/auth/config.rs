//! Resolver configuration and environment snapshot

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use typed_builder::TypedBuilder;

use super::legacy;

/// Linear OAuth token endpoint
pub const LINEAR_TOKEN_ENDPOINT: &str = "https://api.linear.app/oauth/token";

/// Public client id of the Linear agent CLI application
pub const DEFAULT_CLIENT_ID: &str = "984973f7762db2dc5dd3c939e3f5139c";

/// How long before expiry a stored token is refreshed
pub const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(5 * 60);

/// Required prefix of personal API keys
pub const API_KEY_PREFIX: &str = "lin_api_";

/// Personal API key variable
pub const ENV_API_KEY: &str = "LINEAR_API_KEY";

/// OAuth client id variable
pub const ENV_CLIENT_ID: &str = "LINEAR_CLIENT_ID";

/// OAuth client secret variable
pub const ENV_CLIENT_SECRET: &str = "LINEAR_CLIENT_SECRET";

/// Settings for [`CredentialResolver`](super::CredentialResolver)
#[derive(Debug, Clone, TypedBuilder)]
#[builder(
    builder_method(doc = "Create a new builder for ResolverConfig"),
    builder_type(doc = "Builder for ResolverConfig", vis = "pub"),
    build_method(doc = "Build the ResolverConfig")
)]
pub struct ResolverConfig {
    /// Client id used to refresh a stored token when none was stored
    #[builder(default = DEFAULT_CLIENT_ID.to_string(), setter(into))]
    pub default_client_id: String,

    /// Token endpoint for the client-credentials grant
    #[builder(default = LINEAR_TOKEN_ENDPOINT.to_string(), setter(into))]
    pub token_url: String,

    /// Stored tokens expiring within this window are refreshed
    #[builder(default = TOKEN_EXPIRY_BUFFER)]
    pub refresh_buffer: Duration,

    /// Legacy TOML config files to consult for `api_key`, in order
    #[builder(default = legacy::default_paths())]
    pub legacy_config_paths: Vec<PathBuf>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Credentials supplied through the environment, captured once.
///
/// Empty variables count as unset.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EnvCredentials {
    /// `LINEAR_API_KEY`
    pub api_key: Option<String>,
    /// `LINEAR_CLIENT_ID`
    pub client_id: Option<String>,
    /// `LINEAR_CLIENT_SECRET`
    pub client_secret: Option<String>,
}

impl EnvCredentials {
    /// Snapshot the current process environment
    #[must_use]
    pub fn from_process() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|value| !value.is_empty());
        Self {
            api_key: read(ENV_API_KEY),
            client_id: read(ENV_CLIENT_ID),
            client_secret: read(ENV_CLIENT_SECRET),
        }
    }

    /// No credential variables set
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn static_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }

    pub(crate) fn client_credentials(&self) -> Option<(&str, &str)> {
        let id = self.client_id.as_deref().filter(|id| !id.is_empty())?;
        let secret = self
            .client_secret
            .as_deref()
            .filter(|secret| !secret.is_empty())?;
        Some((id, secret))
    }
}

impl fmt::Debug for EnvCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = |value: &Option<String>| if value.is_some() { "(set)" } else { "(unset)" };
        f.debug_struct("EnvCredentials")
            .field("api_key", &set(&self.api_key))
            .field("client_id", &self.client_id)
            .field("client_secret", &set(&self.client_secret))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> EnvCredentials {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        EnvCredentials::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_config_default() {
        let config = ResolverConfig::default();
        assert_eq!(config.default_client_id, DEFAULT_CLIENT_ID);
        assert_eq!(config.token_url, LINEAR_TOKEN_ENDPOINT);
        assert_eq!(config.refresh_buffer, Duration::from_secs(300));
    }

    #[test]
    fn test_config_builder() {
        let config = ResolverConfig::builder()
            .default_client_id("my-app")
            .token_url("http://127.0.0.1:9/oauth/token")
            .legacy_config_paths(Vec::new())
            .build();
        assert_eq!(config.default_client_id, "my-app");
        assert!(config.legacy_config_paths.is_empty());
    }

    #[test]
    fn test_empty_variables_count_as_unset() {
        let env = lookup(&[(ENV_API_KEY, ""), (ENV_CLIENT_ID, "id")]);
        assert!(env.static_key().is_none());
        assert!(env.client_credentials().is_none());
    }

    #[test]
    fn test_client_credentials_need_both_halves() {
        let env = lookup(&[(ENV_CLIENT_ID, "id"), (ENV_CLIENT_SECRET, "secret")]);
        assert_eq!(env.client_credentials(), Some(("id", "secret")));

        let env = lookup(&[(ENV_CLIENT_SECRET, "secret")]);
        assert!(env.client_credentials().is_none());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let env = lookup(&[(ENV_API_KEY, "lin_api_topsecret"), (ENV_CLIENT_SECRET, "hush")]);
        let debug = format!("{env:?}");
        assert!(!debug.contains("topsecret"));
        assert!(!debug.contains("hush"));
        assert!(debug.contains("(set)"));
    }
}
