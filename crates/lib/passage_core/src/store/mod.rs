//! Storage contracts for users and session credentials.
//!
//! Two backends satisfy the same contracts: [`memory`] (a single
//! reader/writer lock over a map) and [`postgres`] (`sqlx` over `PgPool`).

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::auth::AuthResult;
use crate::models::{SessionCredential, User};

pub use memory::{MemoryCredentialStore, MemoryUserDirectory};
pub use postgres::{PgCredentialStore, PgUserDirectory};

/// Keyed storage of user records, addressable by id and by email.
///
/// Email uniqueness is not enforced here; the login flow looks up by email
/// before creating.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Insert or overwrite the record keyed by `user.id`.
    async fn create(&self, user: &User) -> AuthResult<()>;

    async fn find_by_email(&self, email: &str) -> AuthResult<User>;

    async fn find_by_id(&self, id: &str) -> AuthResult<User>;

    /// Write back an existing record. Never creates.
    async fn update(&self, user: &User) -> AuthResult<()>;
}

/// At most one live credential per user id, plus reverse lookup by token.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Store `credential`, replacing any previous one for `user_id`.
    async fn save(&self, user_id: &str, credential: &SessionCredential) -> AuthResult<()>;

    async fn get(&self, user_id: &str) -> AuthResult<SessionCredential>;

    /// Remove the credential. Succeeds when nothing is stored.
    async fn delete(&self, user_id: &str) -> AuthResult<()>;

    /// Find the user owning a credential whose access or refresh value is
    /// `raw_token`. `Expired` if it matched a stale credential,
    /// `InvalidToken` if nothing matched.
    async fn resolve_by_token(&self, raw_token: &str) -> AuthResult<String>;
}
