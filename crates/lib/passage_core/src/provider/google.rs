//! Google OAuth2 gateway.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::IdentityProvider;
use crate::auth::{AuthError, AuthResult};
use crate::models::{ProviderIdentity, ProviderToken};

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Scopes requested on the consent screen.
const SCOPES: &[&str] = &[
    "openid",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

/// Client credentials and endpoints for [`GoogleProvider`].
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Used when a login does not supply its own redirect URI.
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl GoogleConfig {
    /// Config pointing at Google's production endpoints.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            auth_url: GOOGLE_AUTH_URL.into(),
            token_url: GOOGLE_TOKEN_URL.into(),
            userinfo_url: GOOGLE_USERINFO_URL.into(),
        }
    }
}

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    #[serde(default)]
    expires_in: i64,
    refresh_token: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".into()
}

pub struct GoogleProvider {
    client: reqwest::Client,
    config: GoogleConfig,
}

impl GoogleProvider {
    pub fn new(config: GoogleConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &GoogleConfig {
        &self.config
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn authorization_url(&self, state: &str) -> AuthResult<String> {
        let url = Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES.join(" ").as_str()),
                ("state", state),
                ("access_type", "offline"),
            ],
        )
        .map_err(|e| AuthError::Internal(format!("invalid auth url: {e}")))?;
        Ok(url.into())
    }

    async fn exchange(&self, code: &str, redirect_uri: &str) -> AuthResult<ProviderToken> {
        let redirect_uri = if redirect_uri.is_empty() {
            self.config.redirect_uri.as_str()
        } else {
            redirect_uri
        };

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
        ];

        let resp = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::ExchangeFailed(format!("token request: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            debug!(%status, "token exchange rejected");
            return Err(AuthError::ExchangeFailed(format!(
                "token endpoint HTTP {status}: {body}"
            )));
        }

        let token = resp
            .json::<GoogleTokenResponse>()
            .await
            .map_err(|e| AuthError::ExchangeFailed(format!("token response parse error: {e}")))?;

        Ok(ProviderToken::from_expires_in(
            token.access_token,
            token.refresh_token,
            token.expires_in,
            token.token_type,
        ))
    }

    async fn fetch_profile(&self, access_token: &str) -> AuthResult<ProviderIdentity> {
        let resp = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::ProfileFetchFailed(format!("userinfo request: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            debug!(%status, "userinfo rejected");
            return Err(AuthError::ProfileFetchFailed(format!(
                "userinfo endpoint HTTP {status}"
            )));
        }

        resp.json::<ProviderIdentity>()
            .await
            .map_err(|e| AuthError::ProfileFetchFailed(format!("userinfo parse error: {e}")))
    }
}
