//! Token and credential domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, AuthResult};

/// Token type label attached to every issued credential.
pub const BEARER: &str = "Bearer";

/// Which half of a credential pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// JWT claims embedded in access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: user ID (standard JWT `sub` claim).
    pub sub: String,
    pub kind: TokenKind,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Random token ID; keeps two tokens minted in the same second distinct.
    pub jti: String,
}

/// The access/refresh pair held server-side for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredential {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub token_type: String,
}

impl SessionCredential {
    /// Build a credential, rejecting blank or identical token values and a
    /// non-positive expiry.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: DateTime<Utc>,
        token_type: impl Into<String>,
    ) -> AuthResult<Self> {
        let access_token = access_token.into();
        let refresh_token = refresh_token.into();

        if access_token.trim().is_empty() {
            return Err(AuthError::InvalidInput("access token cannot be empty".into()));
        }
        if refresh_token.trim().is_empty() {
            return Err(AuthError::InvalidInput("refresh token cannot be empty".into()));
        }
        if access_token == refresh_token {
            return Err(AuthError::InvalidInput(
                "access and refresh tokens must differ".into(),
            ));
        }
        if expires_at.timestamp() <= 0 {
            return Err(AuthError::InvalidInput("expiry must be positive".into()));
        }

        Ok(Self {
            access_token,
            refresh_token,
            expires_at,
            token_type: token_type.into(),
        })
    }

    /// Whether the credential has expired as of now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Expiry is inclusive: a credential expiring exactly at `now` is expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether `raw_token` is either half of this credential.
    pub fn matches(&self, raw_token: &str) -> bool {
        self.access_token == raw_token || self.refresh_token == raw_token
    }

    /// Expiry as a unix timestamp.
    pub fn expires_in(&self) -> i64 {
        self.expires_at.timestamp()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn in_an_hour() -> DateTime<Utc> {
        Utc::now() + Duration::hours(1)
    }

    #[test]
    fn new_accepts_valid_pair() {
        let cred = SessionCredential::new("access_123", "refresh_456", in_an_hour(), BEARER)
            .expect("valid credential");
        assert_eq!(cred.access_token, "access_123");
        assert_eq!(cred.refresh_token, "refresh_456");
        assert_eq!(cred.token_type, "Bearer");
    }

    #[test]
    fn new_rejects_empty_access_token() {
        let err = SessionCredential::new("", "refresh_456", in_an_hour(), BEARER).unwrap_err();
        assert!(matches!(err, AuthError::InvalidInput(_)));
    }

    #[test]
    fn new_rejects_empty_refresh_token() {
        let err = SessionCredential::new("access_123", " ", in_an_hour(), BEARER).unwrap_err();
        assert!(matches!(err, AuthError::InvalidInput(_)));
    }

    #[test]
    fn new_rejects_identical_tokens() {
        let err = SessionCredential::new("same", "same", in_an_hour(), BEARER).unwrap_err();
        assert!(matches!(err, AuthError::InvalidInput(_)));
    }

    #[test]
    fn new_rejects_epoch_expiry() {
        let epoch = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        let err = SessionCredential::new("a", "r", epoch, BEARER).unwrap_err();
        assert!(matches!(err, AuthError::InvalidInput(_)));
    }

    #[test]
    fn still_valid_before_expiry() {
        let cred = SessionCredential::new("a", "r", in_an_hour(), BEARER).unwrap();
        assert!(!cred.is_expired());
    }

    #[test]
    fn expired_after_expiry() {
        let cred =
            SessionCredential::new("a", "r", Utc::now() - Duration::hours(1), BEARER).unwrap();
        assert!(cred.is_expired());
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let now = Utc::now();
        let cred = SessionCredential::new("a", "r", now, BEARER).unwrap();
        assert!(cred.is_expired_at(now));
        assert!(!cred.is_expired_at(now - Duration::seconds(1)));
    }

    #[test]
    fn matches_either_half() {
        let cred = SessionCredential::new("a", "r", in_an_hour(), BEARER).unwrap();
        assert!(cred.matches("a"));
        assert!(cred.matches("r"));
        assert!(!cred.matches("x"));
    }

    #[test]
    fn token_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TokenKind::Refresh).unwrap(), "\"refresh\"");
        assert_eq!(TokenKind::Access.as_str(), "access");
    }
}
