//! Request and response bodies.

use chrono::{DateTime, Utc};
use passage_core::models::User;
use passage_core::session::{LoginOutcome, RefreshOutcome};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// OAuth callback parameters, accepted as a JSON body or a query string.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub code: String,
    pub state: String,
    #[serde(default)]
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub picture: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            picture: u.picture,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry of the issued credential (unix timestamp).
    pub expires_in: i64,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(o: LoginOutcome) -> Self {
        Self {
            user: o.user.into(),
            access_token: o.access_token,
            refresh_token: o.refresh_token,
            expires_in: o.expires_in,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry of the issued credential (unix timestamp).
    pub expires_in: i64,
}

impl From<RefreshOutcome> for RefreshResponse {
    fn from(o: RefreshOutcome) -> Self {
        Self {
            access_token: o.access_token,
            refresh_token: o.refresh_token,
            expires_in: o.expires_in,
        }
    }
}
