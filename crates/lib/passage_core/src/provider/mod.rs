//! Identity provider gateway.
//!
//! The session flow only needs three capabilities from a provider: a consent
//! URL, a code→token exchange, and a profile fetch. [`google`] implements
//! them against Google's OAuth2 endpoints; [`state`] holds the CSRF `state`
//! values handed out with consent URLs.

pub mod google;
pub mod state;

use async_trait::async_trait;

use crate::auth::AuthResult;
use crate::models::{ProviderIdentity, ProviderToken};

pub use google::{GoogleConfig, GoogleProvider};
pub use state::OAuthStateStore;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Consent URL the browser is sent to, carrying `state`.
    fn authorization_url(&self, state: &str) -> AuthResult<String>;

    /// Exchange an authorization code. Fails with `ExchangeFailed`.
    async fn exchange(&self, code: &str, redirect_uri: &str) -> AuthResult<ProviderToken>;

    /// Fetch the profile behind a provider access token. Fails with
    /// `ProfileFetchFailed`.
    async fn fetch_profile(&self, access_token: &str) -> AuthResult<ProviderIdentity>;
}
