//! In-memory stores guarded by one `RwLock` per collection.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CredentialStore, UserDirectory};
use crate::auth::{AuthError, AuthResult, require};
use crate::models::{SessionCredential, User};

#[derive(Debug, Default)]
struct UserTables {
    by_id: HashMap<String, User>,
    id_by_email: HashMap<String, String>,
}

/// In-memory [`UserDirectory`].
#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    tables: RwLock<UserTables>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn create(&self, user: &User) -> AuthResult<()> {
        require(&user.id, "user id")?;

        let mut tables = self.tables.write().await;
        if let Some(previous) = tables.by_id.insert(user.id.clone(), user.clone())
            && previous.email != user.email
            && tables.id_by_email.get(&previous.email) == Some(&user.id)
        {
            tables.id_by_email.remove(&previous.email);
        }
        tables.id_by_email.insert(user.email.clone(), user.id.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<User> {
        require(email, "email")?;

        let tables = self.tables.read().await;
        tables
            .id_by_email
            .get(email)
            .and_then(|id| tables.by_id.get(id))
            .cloned()
            .ok_or_else(|| AuthError::NotFound("user not found".into()))
    }

    async fn find_by_id(&self, id: &str) -> AuthResult<User> {
        require(id, "id")?;

        self.tables
            .read()
            .await
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| AuthError::NotFound("user not found".into()))
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        require(&user.id, "user id")?;

        let mut tables = self.tables.write().await;
        let existing = tables
            .by_id
            .get_mut(&user.id)
            .ok_or_else(|| AuthError::NotFound("user not found".into()))?;
        // id, email and created_at are fixed after creation.
        existing.name = user.name.clone();
        existing.picture = user.picture.clone();
        existing.updated_at = user.updated_at;
        Ok(())
    }
}

/// In-memory [`CredentialStore`]. `resolve_by_token` scans every credential.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    tokens: RwLock<HashMap<String, SessionCredential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn save(&self, user_id: &str, credential: &SessionCredential) -> AuthResult<()> {
        require(user_id, "user id")?;
        require(&credential.access_token, "access token")?;
        require(&credential.refresh_token, "refresh token")?;

        self.tokens
            .write()
            .await
            .insert(user_id.to_string(), credential.clone());
        Ok(())
    }

    async fn get(&self, user_id: &str) -> AuthResult<SessionCredential> {
        require(user_id, "user id")?;

        self.tokens
            .read()
            .await
            .get(user_id)
            .cloned()
            .ok_or_else(|| AuthError::NotFound("token not found".into()))
    }

    async fn delete(&self, user_id: &str) -> AuthResult<()> {
        require(user_id, "user id")?;

        self.tokens.write().await.remove(user_id);
        Ok(())
    }

    async fn resolve_by_token(&self, raw_token: &str) -> AuthResult<String> {
        require(raw_token, "token")?;

        let tokens = self.tokens.read().await;
        let (user_id, credential) = tokens
            .iter()
            .find(|(_, credential)| credential.matches(raw_token))
            .ok_or(AuthError::InvalidToken)?;
        if credential.is_expired() {
            return Err(AuthError::Expired);
        }
        Ok(user_id.clone())
    }
}
