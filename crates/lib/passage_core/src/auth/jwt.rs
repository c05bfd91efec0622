//! JWT token generation and verification.

use std::path::PathBuf;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::{debug, info};
use uuid::Uuid;

use super::{AuthError, AuthResult, require};
use crate::models::auth::{TokenClaims, TokenKind};

/// Access token lifetime: 24 hours.
pub const ACCESS_TOKEN_EXPIRY_SECS: i64 = 24 * 60 * 60;

/// Refresh token lifetime: 30 days.
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 30;

/// Lifetimes applied by a [`TokenIssuer`].
#[derive(Debug, Clone, Copy)]
pub struct TokenSettings {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            access_ttl: Duration::seconds(ACCESS_TOKEN_EXPIRY_SECS),
            refresh_ttl: Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
        }
    }
}

/// Mints and verifies HS256-signed tokens.
///
/// Built once at startup; the signing key never changes afterwards, so a
/// shared `Arc<TokenIssuer>` needs no locking.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    settings: TokenSettings,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], settings: TokenSettings) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            settings,
        }
    }

    /// Issuer with the default 24h / 30d lifetimes.
    pub fn from_secret(secret: &[u8]) -> Self {
        Self::new(secret, TokenSettings::default())
    }

    pub fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    /// Generate a signed access token for `user_id`.
    pub fn issue_access(&self, user_id: &str) -> AuthResult<String> {
        self.issue(user_id, TokenKind::Access)
    }

    /// Generate a signed refresh token for `user_id`.
    pub fn issue_refresh(&self, user_id: &str) -> AuthResult<String> {
        self.issue(user_id, TokenKind::Refresh)
    }

    fn issue(&self, user_id: &str, kind: TokenKind) -> AuthResult<String> {
        require(user_id, "user id")?;

        let ttl = match kind {
            TokenKind::Access => self.settings.access_ttl,
            TokenKind::Refresh => self.settings.refresh_ttl,
        };
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user_id.to_string(),
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
    }

    /// Verify signature, structure and expiry, returning the claims.
    pub fn decode(&self, token: &str) -> AuthResult<TokenClaims> {
        require(token, "token")?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let claims = decode::<TokenClaims>(token, &self.decoding, &validation)
            .map_err(|e| {
                debug!(error = %e, "token rejected");
                AuthError::InvalidToken
            })?
            .claims;

        // jsonwebtoken treats `exp == now` as live; expiry here is inclusive.
        if claims.exp <= Utc::now().timestamp() {
            debug!("token rejected: expired");
            return Err(AuthError::InvalidToken);
        }
        if claims.sub.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }

    /// Verify a token of either kind, returning its subject user ID.
    pub fn verify(&self, token: &str) -> AuthResult<String> {
        self.decode(token).map(|claims| claims.sub)
    }

    /// Verify a token and require it to be of `kind`.
    pub fn verify_kind(&self, token: &str, kind: TokenKind) -> AuthResult<String> {
        let claims = self.decode(token)?;
        if claims.kind != kind {
            debug!(
                expected = kind.as_str(),
                found = claims.kind.as_str(),
                "token rejected: wrong kind"
            );
            return Err(AuthError::InvalidToken);
        }
        Ok(claims.sub)
    }
}

/// Resolve the JWT secret: env var `JWT_SECRET` → persisted file → generated.
pub fn resolve_jwt_secret() -> String {
    if let Ok(secret) = std::env::var("JWT_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    let secret_path = jwt_secret_path();
    if let Ok(existing) = std::fs::read_to_string(&secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    if let Some(parent) = secret_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = std::fs::write(&secret_path, &secret);
    info!(path = %secret_path.display(), "generated new JWT secret");
    secret
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("passage")
        .join("jwt-secret")
}
