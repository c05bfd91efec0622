//! Authentication errors and token handling.
//!
//! Every component in this crate reports failures through [`AuthError`], so
//! the transport layer can map each kind to its own response without
//! inspecting messages.

pub mod jwt;

use thiserror::Error;

/// Convenience alias for results carrying an [`AuthError`].
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A caller-supplied value was empty or malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Signature, structure, kind, or expiry check failed.
    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    /// A stored credential matched but its expiry has passed.
    #[error("Token expired")]
    Expired,

    #[error("Email not verified")]
    EmailNotVerified,

    #[error("Authorization code exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("Profile fetch failed: {0}")]
    ProfileFetchFailed(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Reject an empty (or whitespace-only) caller-supplied value.
pub(crate) fn require(value: &str, what: &str) -> AuthResult<()> {
    if value.trim().is_empty() {
        return Err(AuthError::InvalidInput(format!("{what} cannot be empty")));
    }
    Ok(())
}
