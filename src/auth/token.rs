//! Exchanged access tokens as persisted in the `token_info` secret

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OAuth token information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Access token for API calls
    pub access_token: String,

    /// Token type (usually "Bearer")
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Lifetime in seconds as reported by the token endpoint
    #[serde(default)]
    pub expires_in: u64,

    /// When the token stops being accepted
    pub expires_at: DateTime<Utc>,

    /// Scopes granted to this token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl TokenInfo {
    /// Create token info from a token endpoint response received now
    #[must_use]
    pub fn new(
        access_token: String,
        token_type: Option<String>,
        expires_in: u64,
        scope: Option<String>,
    ) -> Self {
        Self {
            access_token,
            token_type: token_type.unwrap_or_else(default_token_type),
            expires_in,
            expires_at: expiry_after(Utc::now(), expires_in),
            scope,
        }
    }

    /// Create token info with an explicit expiry
    #[must_use]
    pub fn with_expiry(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        let expires_in = expires_at
            .signed_duration_since(Utc::now())
            .num_seconds()
            .max(0)
            .unsigned_abs();

        Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
            expires_in,
            expires_at,
            scope: None,
        }
    }

    /// Whether the token can still be used without refreshing: it must stay
    /// valid for at least `buffer` past `now`.
    #[must_use]
    pub fn is_fresh_at(&self, now: DateTime<Utc>, buffer: Duration) -> bool {
        TimeDelta::from_std(buffer)
            .ok()
            .and_then(|buffer| now.checked_add_signed(buffer))
            .is_some_and(|deadline| deadline < self.expires_at)
    }

    /// [`is_fresh_at`](Self::is_fresh_at) against the current time
    #[must_use]
    pub fn is_fresh(&self, buffer: Duration) -> bool {
        self.is_fresh_at(Utc::now(), buffer)
    }
}

fn expiry_after(now: DateTime<Utc>, expires_in: u64) -> DateTime<Utc> {
    i64::try_from(expires_in)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUFFER: Duration = Duration::from_secs(300);

    #[test]
    fn test_token_info_new() {
        let token = TokenInfo::new(
            "access123".to_string(),
            None,
            3600,
            Some("read,write".to_string()),
        );

        assert_eq!(token.access_token, "access123");
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 3600);
        assert!(token.is_fresh(BUFFER));
        assert!(token.expires_at > Utc::now() + TimeDelta::seconds(3590));
    }

    #[test]
    fn test_token_expired() {
        let token = TokenInfo::with_expiry("access123", Utc::now() - TimeDelta::seconds(100));

        assert!(!token.is_fresh(BUFFER));
        assert!(!token.is_fresh(Duration::ZERO));
        assert_eq!(token.expires_in, 0);
    }

    #[test]
    fn test_refresh_buffer_boundary() {
        let now = Utc::now();

        let inside = TokenInfo::with_expiry("a", now + TimeDelta::seconds(299));
        assert!(!inside.is_fresh_at(now, BUFFER));

        let exact = TokenInfo::with_expiry("a", now + TimeDelta::seconds(300));
        assert!(!exact.is_fresh_at(now, BUFFER));

        let outside = TokenInfo::with_expiry("a", now + TimeDelta::seconds(301));
        assert!(outside.is_fresh_at(now, BUFFER));
    }

    #[test]
    fn test_huge_lifetime_saturates() {
        let token = TokenInfo::new("a".to_string(), None, u64::MAX, None);
        assert_eq!(token.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(token.is_fresh(BUFFER));
    }

    #[test]
    fn test_json_shape() {
        let token = TokenInfo::with_expiry("tok", "2030-01-01T00:00:00Z".parse().unwrap());
        let json = serde_json::to_value(&token).unwrap();

        assert_eq!(json["access_token"], "tok");
        assert_eq!(json["token_type"], "Bearer");
        assert_eq!(json["expires_at"], "2030-01-01T00:00:00Z");
        assert!(json.get("scope").is_none());
    }

    #[test]
    fn test_decodes_token_written_with_fractional_seconds() {
        let raw = r#"{
            "access_token": "tok",
            "token_type": "Bearer",
            "expires_in": 2591999,
            "expires_at": "2030-01-01T00:00:00.123456789+02:00",
            "scope": "read"
        }"#;
        let token: TokenInfo = serde_json::from_str(raw).unwrap();
        assert_eq!(token.scope.as_deref(), Some("read"));
        assert_eq!(token.expires_at.to_rfc3339(), "2029-12-31T22:00:00.123456789+00:00");
    }
}
