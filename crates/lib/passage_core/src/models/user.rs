//! User and provider identity models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, AuthResult};

/// RFC 5321 limits.
const MAX_EMAIL_LEN: usize = 254;
const MAX_LOCAL_PART_LEN: usize = 64;

/// Durable local account record.
///
/// `id`, `email` and `created_at` are fixed at creation; only the profile
/// fields and `updated_at` change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub picture: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a validated user stamped with `created_at == updated_at == now`.
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        picture: impl Into<String>,
    ) -> AuthResult<Self> {
        let now = Utc::now();
        let user = Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            picture: picture.into(),
            created_at: now,
            updated_at: now,
        };
        user.validate()?;
        Ok(user)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    fn validate(&self) -> AuthResult<()> {
        if self.id.trim().is_empty() {
            return Err(AuthError::InvalidInput("user id cannot be empty".into()));
        }
        if self.email.trim().is_empty() {
            return Err(AuthError::InvalidInput("email cannot be empty".into()));
        }
        if !is_valid_email(&self.email) {
            return Err(AuthError::InvalidInput(format!(
                "invalid email address: {}",
                self.email
            )));
        }
        if self.name.trim().is_empty() {
            return Err(AuthError::InvalidInput("name cannot be empty".into()));
        }
        Ok(())
    }

    /// Replace display name and avatar, bumping `updated_at`.
    pub fn update_profile(
        &mut self,
        name: impl Into<String>,
        picture: impl Into<String>,
    ) -> AuthResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AuthError::InvalidInput("name cannot be empty".into()));
        }
        self.name = name;
        self.picture = picture.into();
        self.updated_at = Utc::now().max(self.created_at);
        Ok(())
    }
}

/// Check that `email` is a single well-formed `local@domain` address.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.len() > MAX_EMAIL_LEN {
        return false;
    }
    if email.chars().any(|c| c.is_whitespace() || c.is_control() || "<>()[],;:\"\\".contains(c)) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if domain.contains('@') {
        return false;
    }
    if local.is_empty() || local.len() > MAX_LOCAL_PART_LEN {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }

    !domain.is_empty()
        && domain
            .split('.')
            .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'))
}

/// Provider-asserted profile, alive only for one login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderIdentity {
    pub id: String,
    pub email: String,
    #[serde(rename = "verified_email", alias = "email_verified", default)]
    pub email_verified: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: String,
}

impl ProviderIdentity {
    pub fn is_verified(&self) -> bool {
        self.email_verified
    }

    /// Materialize a new local user from this profile.
    pub fn to_user(&self) -> AuthResult<User> {
        User::new(&self.id, &self.email, &self.name, &self.picture)
    }
}

/// Token pair returned by the provider for an authorization code.
#[derive(Debug, Clone)]
pub struct ProviderToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub token_type: String,
}

impl ProviderToken {
    /// Build from an `expires_in` (seconds from now) as returned by OAuth2 token endpoints.
    pub fn from_expires_in(
        access_token: String,
        refresh_token: Option<String>,
        expires_in: i64,
        token_type: String,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(expires_in),
            token_type,
        }
    }
}
