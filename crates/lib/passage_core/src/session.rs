//! Session orchestration: login, refresh, and logout.
//!
//! Each flow is a short sequential pipeline over the token issuer, the user
//! directory, the credential store and the identity provider. Nothing is
//! retried and nothing is rolled back: a login that fails after the user
//! record is written leaves that record in place.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::auth::jwt::TokenIssuer;
use crate::auth::{AuthError, AuthResult, require};
use crate::models::{BEARER, ProviderIdentity, SessionCredential, TokenKind, User};
use crate::provider::IdentityProvider;
use crate::store::{CredentialStore, UserDirectory};

/// Behavior switches for [`SessionService`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionSettings {
    /// Only the refresh token of the currently stored credential may be
    /// redeemed. Off by default: any unexpired refresh token signed by the
    /// issuer is accepted.
    pub single_use_refresh: bool,
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    /// Credential expiry (unix timestamp).
    pub expires_in: i64,
}

/// Result of a successful refresh.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub access_token: String,
    pub refresh_token: String,
    /// Credential expiry (unix timestamp).
    pub expires_in: i64,
}

/// Composes the issuer, stores and provider into the three session flows.
#[derive(Clone)]
pub struct SessionService {
    issuer: Arc<TokenIssuer>,
    users: Arc<dyn UserDirectory>,
    credentials: Arc<dyn CredentialStore>,
    provider: Arc<dyn IdentityProvider>,
    settings: SessionSettings,
}

impl SessionService {
    pub fn new(
        issuer: Arc<TokenIssuer>,
        users: Arc<dyn UserDirectory>,
        credentials: Arc<dyn CredentialStore>,
        provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            issuer,
            users,
            credentials,
            provider,
            settings: SessionSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    /// Exchange an authorization code for a local session.
    pub async fn login(&self, code: &str, redirect_uri: &str) -> AuthResult<LoginOutcome> {
        require(code, "authorization code")?;

        let provider_token = self.provider.exchange(code, redirect_uri).await?;
        let identity = self
            .provider
            .fetch_profile(&provider_token.access_token)
            .await?;

        if !identity.is_verified() {
            warn!(provider_id = %identity.id, "login rejected: email not verified");
            return Err(AuthError::EmailNotVerified);
        }

        let user = self.reconcile_user(&identity).await?;
        let credential = self.mint_credential(&user.id)?;
        self.credentials.save(&user.id, &credential).await?;

        info!(user_id = %user.id, "login succeeded");
        Ok(LoginOutcome {
            expires_in: credential.expires_in(),
            access_token: credential.access_token,
            refresh_token: credential.refresh_token,
            user,
        })
    }

    /// Trade a refresh token for a new credential pair.
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<RefreshOutcome> {
        let user_id = self
            .issuer
            .verify_kind(refresh_token, TokenKind::Refresh)
            .map_err(|e| {
                debug!(error = %e, "refresh rejected");
                AuthError::InvalidRefreshToken
            })?;

        if self.settings.single_use_refresh {
            match self.credentials.get(&user_id).await {
                Ok(current) if current.refresh_token == refresh_token => {}
                Ok(_) | Err(AuthError::NotFound(_)) => {
                    debug!(user_id = %user_id, "refresh rejected: superseded token");
                    return Err(AuthError::InvalidRefreshToken);
                }
                Err(e) => return Err(e),
            }
        }

        let credential = self.mint_credential(&user_id)?;
        self.credentials.save(&user_id, &credential).await?;

        info!(user_id = %user_id, "session refreshed");
        Ok(RefreshOutcome {
            expires_in: credential.expires_in(),
            access_token: credential.access_token,
            refresh_token: credential.refresh_token,
        })
    }

    /// Drop the user's stored credential. Idempotent.
    pub async fn logout(&self, user_id: &str) -> AuthResult<()> {
        self.credentials.delete(user_id).await?;
        info!(user_id = %user_id, "logged out");
        Ok(())
    }

    /// Resolve an access token to its user ID.
    pub fn authenticate(&self, raw_token: &str) -> AuthResult<String> {
        self.issuer.verify_kind(raw_token, TokenKind::Access)
    }

    /// Look up the directory record for an authenticated user.
    pub async fn current_user(&self, user_id: &str) -> AuthResult<User> {
        self.users.find_by_id(user_id).await
    }

    /// Update the existing record for this email, or create one.
    async fn reconcile_user(&self, identity: &ProviderIdentity) -> AuthResult<User> {
        match self.users.find_by_email(&identity.email).await {
            Ok(mut user) => {
                user.update_profile(&identity.name, &identity.picture)?;
                self.users.update(&user).await?;
                debug!(user_id = %user.id, "updated returning user");
                Ok(user)
            }
            Err(AuthError::NotFound(_)) => {
                let user = identity.to_user()?;
                self.users.create(&user).await?;
                info!(user_id = %user.id, "created user");
                Ok(user)
            }
            Err(e) => Err(e),
        }
    }

    fn mint_credential(&self, user_id: &str) -> AuthResult<SessionCredential> {
        let access = self.issuer.issue_access(user_id)?;
        let refresh = self.issuer.issue_refresh(user_id)?;
        let expires_at = Utc::now() + self.issuer.settings().access_ttl;
        SessionCredential::new(access, refresh, expires_at, BEARER)
    }
}
