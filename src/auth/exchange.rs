//! Client-credentials token exchange

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::config::LINEAR_TOKEN_ENDPOINT;
use super::token::TokenInfo;

/// Errors that can occur during a token exchange
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The token endpoint answered with a structured OAuth error
    #[error("{message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// `error` plus `error_description` when present
        message: String,
    },

    /// Non-2xx response without a structured error body
    #[error("token request failed with status {0}")]
    Status(u16),

    /// 2xx response that is not a token
    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    /// Transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The caller cancelled the request
    #[error("token request cancelled")]
    Cancelled,
}

/// Successful response from the token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    expires_in: u64,
    #[serde(default)]
    scope: Option<String>,
}

/// Error response from the token endpoint
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchanges long-lived client credentials for a short-lived access token.
///
/// One call is one round trip: no retry, no backoff. Implementations must
/// return [`ExchangeError::Cancelled`] promptly once `cancel` fires.
#[async_trait]
pub trait TokenExchanger: Send + Sync + std::fmt::Debug {
    /// Perform the client-credentials grant
    async fn exchange(
        &self,
        client_id: &str,
        client_secret: &str,
        cancel: &CancellationToken,
    ) -> Result<TokenInfo, ExchangeError>;
}

/// [`TokenExchanger`] speaking form-encoded OAuth to an HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpTokenExchanger {
    token_url: String,
    http_client: reqwest::Client,
}

impl Default for HttpTokenExchanger {
    fn default() -> Self {
        Self::new(LINEAR_TOKEN_ENDPOINT)
    }
}

impl HttpTokenExchanger {
    /// Create an exchanger posting to `token_url`
    pub fn new(token_url: impl Into<String>) -> Self {
        Self::with_client(token_url, reqwest::Client::new())
    }

    /// Create an exchanger reusing an existing HTTP client
    pub fn with_client(token_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            token_url: token_url.into(),
            http_client,
        }
    }

    /// Get the token endpoint
    #[must_use]
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    async fn request(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<TokenInfo, ExchangeError> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(error_from_body(status.as_u16(), &body));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            ExchangeError::InvalidResponse(format!("failed to parse token response: {e}"))
        })?;

        Ok(TokenInfo::new(
            token.access_token,
            token.token_type,
            token.expires_in,
            token.scope,
        ))
    }
}

#[async_trait]
impl TokenExchanger for HttpTokenExchanger {
    async fn exchange(
        &self,
        client_id: &str,
        client_secret: &str,
        cancel: &CancellationToken,
    ) -> Result<TokenInfo, ExchangeError> {
        tracing::debug!(token_url = %self.token_url, client_id, "exchanging client credentials");

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ExchangeError::Cancelled),
            result = self.request(client_id, client_secret) => result,
        }
    }
}

fn error_from_body(status: u16, body: &str) -> ExchangeError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(error) => {
            let message = match error.error_description {
                Some(description) if !description.is_empty() => {
                    format!("{}: {description}", error.error)
                }
                _ => error.error,
            };
            ExchangeError::Rejected { status, message }
        }
        Err(_) => ExchangeError::Status(status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_with_description() {
        let err = error_from_body(
            401,
            r#"{"error":"invalid_client","error_description":"Client authentication failed"}"#,
        );
        assert_eq!(err.to_string(), "invalid_client: Client authentication failed");
        assert!(matches!(err, ExchangeError::Rejected { status: 401, .. }));
    }

    #[test]
    fn test_error_without_description() {
        let err = error_from_body(400, r#"{"error":"unsupported_grant_type"}"#);
        assert_eq!(err.to_string(), "unsupported_grant_type");
    }

    #[test]
    fn test_unstructured_error_body() {
        let err = error_from_body(502, "<html>Bad Gateway</html>");
        assert_eq!(err.to_string(), "token request failed with status 502");
    }

    #[test]
    fn test_default_endpoint() {
        let exchanger = HttpTokenExchanger::default();
        assert_eq!(exchanger.token_url(), LINEAR_TOKEN_ENDPOINT);
    }
}
