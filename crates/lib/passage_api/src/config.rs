//! API server configuration.

use passage_core::auth::jwt::resolve_jwt_secret;

/// Default OAuth redirect target, matching the login route on the default port.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080/auth/google/login";

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8080").
    pub bind_addr: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Google OAuth client ID.
    pub google_client_id: String,
    /// Google OAuth client secret.
    pub google_client_secret: String,
    /// Redirect URI registered with Google; used when a login omits one.
    pub google_redirect_uri: String,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable               | Default                                   |
    /// |------------------------|-------------------------------------------|
    /// | `BIND_ADDR`            | `127.0.0.1:8080`                          |
    /// | `JWT_SECRET`           | generated & persisted to file             |
    /// | `GOOGLE_CLIENT_ID`     | empty                                     |
    /// | `GOOGLE_CLIENT_SECRET` | empty                                     |
    /// | `GOOGLE_REDIRECT_URI`  | `http://localhost:8080/auth/google/login` |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into()),
            jwt_secret: resolve_jwt_secret(),
            google_client_id: std::env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            google_client_secret: std::env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            google_redirect_uri: std::env::var("GOOGLE_REDIRECT_URI")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.into()),
        }
    }
}
