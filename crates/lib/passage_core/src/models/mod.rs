//! Domain models.
//!
//! These are internal domain models, distinct from the request/response
//! shapes exposed by `passage_api`.

pub mod auth;
pub mod user;

pub use auth::{BEARER, SessionCredential, TokenClaims, TokenKind};
pub use user::{ProviderIdentity, ProviderToken, User};
