//! Bearer token types with expiry tracking.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A bearer access token with metadata for expiry tracking.
///
/// The expiry carried here is the *usable* lifetime: it is set with a safety
/// margin ahead of the provider's real expiry, so a token that looks valid
/// here is still accepted by the provider for the duration of a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// The access token string presented as `Authorization: Bearer <secret>`.
    pub secret: String,
    /// The moment after which the token must be treated as invalid.
    pub expires_at: DateTime<Utc>,
    /// When this token was obtained.
    pub obtained_at: DateTime<Utc>,
}

impl AccessToken {
    /// Create a token obtained at `now` that stays usable for `ttl`.
    #[must_use]
    pub fn new(secret: String, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            secret,
            expires_at: now + ttl,
            obtained_at: now,
        }
    }

    /// Whether the token is still usable at `now`.
    ///
    /// Validity is strict: a token whose expiry equals `now` is already
    /// considered expired.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Time remaining until expiry at `now`, or `None` once expired.
    #[must_use]
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let remaining = self.expires_at - now;
        (remaining > Duration::zero()).then_some(remaining)
    }

    /// Returns the `Authorization` header value for this token.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.secret)
    }
}

/// Point-in-time snapshot of the cached token state.
///
/// Produced by a pure read; holding one does not keep the underlying
/// token alive or fresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStatus {
    /// Whether any token is cached at all.
    pub has_token: bool,
    /// Expiry of the cached token, if one exists.
    pub expires_at: Option<DateTime<Utc>>,
    /// True when no token is cached or the cached one has expired.
    pub is_expired: bool,
    /// Time remaining before expiry, if a valid token exists.
    pub time_remaining: Option<Duration>,
}

impl TokenStatus {
    /// Snapshot for an empty cache.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            has_token: false,
            expires_at: None,
            is_expired: true,
            time_remaining: None,
        }
    }

    /// Snapshot of `token` as observed at `now`.
    #[must_use]
    pub fn of(token: &AccessToken, now: DateTime<Utc>) -> Self {
        Self {
            has_token: true,
            expires_at: Some(token.expires_at),
            is_expired: !token.is_valid_at(now),
            time_remaining: token.time_remaining(now),
        }
    }

    /// Get a user-friendly one-line summary.
    #[must_use]
    pub fn summary(&self) -> String {
        if !self.has_token {
            return "No token".to_string();
        }
        if self.is_expired {
            return "Token expired".to_string();
        }
        match self.time_remaining.map(|d| d.num_seconds()) {
            Some(secs) if secs > 60 => format!("Token valid for {} minutes", secs / 60),
            Some(secs) => format!("Token valid for {secs} seconds"),
            None => "Token expired".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_token_valid_before_expiry() {
        let token = AccessToken::new("abc".to_string(), at(0), Duration::seconds(100));
        assert!(token.is_valid_at(at(0)));
        assert!(token.is_valid_at(at(99)));
    }

    #[test]
    fn test_token_expired_at_and_after_expiry() {
        let token = AccessToken::new("abc".to_string(), at(0), Duration::seconds(100));
        assert!(!token.is_valid_at(at(100)));
        assert!(!token.is_valid_at(at(101)));
    }

    #[test]
    fn test_time_remaining() {
        let token = AccessToken::new("abc".to_string(), at(0), Duration::seconds(100));
        assert_eq!(token.time_remaining(at(40)), Some(Duration::seconds(60)));
        assert_eq!(token.time_remaining(at(100)), None);
    }

    #[test]
    fn test_authorization_header() {
        let token = AccessToken::new("abc123".to_string(), at(0), Duration::minutes(25));
        assert_eq!(token.authorization_header(), "Bearer abc123");
    }

    #[test]
    fn test_status_of_valid_token() {
        let token = AccessToken::new("abc".to_string(), at(0), Duration::seconds(300));
        let status = TokenStatus::of(&token, at(60));
        assert!(status.has_token);
        assert!(!status.is_expired);
        assert_eq!(status.expires_at, Some(at(300)));
        assert_eq!(status.time_remaining, Some(Duration::seconds(240)));
    }

    #[test]
    fn test_status_of_expired_token() {
        let token = AccessToken::new("abc".to_string(), at(0), Duration::seconds(300));
        let status = TokenStatus::of(&token, at(300));
        assert!(status.has_token);
        assert!(status.is_expired);
        assert_eq!(status.time_remaining, None);
    }

    #[test]
    fn test_status_summaries() {
        assert_eq!(TokenStatus::empty().summary(), "No token");

        let token = AccessToken::new("abc".to_string(), at(0), Duration::minutes(25));
        assert_eq!(
            TokenStatus::of(&token, at(0)).summary(),
            "Token valid for 25 minutes"
        );
        assert_eq!(
            TokenStatus::of(&token, at(25 * 60)).summary(),
            "Token expired"
        );
    }
}
