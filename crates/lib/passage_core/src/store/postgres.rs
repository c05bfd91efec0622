//! PostgreSQL-backed stores.
//!
//! Schema lives in `passage_core/migrations/`. Token lookups go through
//! indexes on `sessions.access_token` and `sessions.refresh_token`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{CredentialStore, UserDirectory};
use crate::auth::{AuthError, AuthResult, require};
use crate::models::{SessionCredential, User};

type UserRow = (String, String, String, String, DateTime<Utc>, DateTime<Utc>);

fn user_from_row((id, email, name, picture, created_at, updated_at): UserRow) -> User {
    User {
        id,
        email,
        name,
        picture,
        created_at,
        updated_at,
    }
}

/// [`UserDirectory`] over the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn create(&self, user: &User) -> AuthResult<()> {
        require(&user.id, "user id")?;

        sqlx::query(
            "INSERT INTO users (id, email, name, picture, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (id) DO UPDATE SET \
               email = EXCLUDED.email, name = EXCLUDED.name, picture = EXCLUDED.picture, \
               created_at = EXCLUDED.created_at, updated_at = EXCLUDED.updated_at",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.picture)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<User> {
        require(email, "email")?;

        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, name, picture, created_at, updated_at \
             FROM users WHERE email = $1 ORDER BY updated_at DESC LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(user_from_row)
            .ok_or_else(|| AuthError::NotFound("user not found".into()))
    }

    async fn find_by_id(&self, id: &str) -> AuthResult<User> {
        require(id, "id")?;

        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, name, picture, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(user_from_row)
            .ok_or_else(|| AuthError::NotFound("user not found".into()))
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        require(&user.id, "user id")?;

        let result = sqlx::query(
            "UPDATE users SET name = $2, picture = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.picture)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AuthError::NotFound("user not found".into()));
        }
        Ok(())
    }
}

/// [`CredentialStore`] over the `sessions` table.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn save(&self, user_id: &str, credential: &SessionCredential) -> AuthResult<()> {
        require(user_id, "user id")?;
        require(&credential.access_token, "access token")?;
        require(&credential.refresh_token, "refresh token")?;

        sqlx::query(
            "INSERT INTO sessions (user_id, access_token, refresh_token, token_type, expires_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id) DO UPDATE SET \
               access_token = EXCLUDED.access_token, refresh_token = EXCLUDED.refresh_token, \
               token_type = EXCLUDED.token_type, expires_at = EXCLUDED.expires_at",
        )
        .bind(user_id)
        .bind(&credential.access_token)
        .bind(&credential.refresh_token)
        .bind(&credential.token_type)
        .bind(credential.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, user_id: &str) -> AuthResult<SessionCredential> {
        require(user_id, "user id")?;

        let row = sqlx::query_as::<_, (String, String, DateTime<Utc>, String)>(
            "SELECT access_token, refresh_token, expires_at, token_type \
             FROM sessions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(
            |(access_token, refresh_token, expires_at, token_type)| SessionCredential {
                access_token,
                refresh_token,
                expires_at,
                token_type,
            },
        )
        .ok_or_else(|| AuthError::NotFound("token not found".into()))
    }

    async fn delete(&self, user_id: &str) -> AuthResult<()> {
        require(user_id, "user id")?;

        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn resolve_by_token(&self, raw_token: &str) -> AuthResult<String> {
        require(raw_token, "token")?;

        let row = sqlx::query_as::<_, (String, DateTime<Utc>)>(
            "SELECT user_id, expires_at FROM sessions \
             WHERE access_token = $1 OR refresh_token = $1 LIMIT 1",
        )
        .bind(raw_token)
        .fetch_optional(&self.pool)
        .await?;

        let (user_id, expires_at) = row.ok_or(AuthError::InvalidToken)?;
        if Utc::now() >= expires_at {
            return Err(AuthError::Expired);
        }
        Ok(user_id)
    }
}
