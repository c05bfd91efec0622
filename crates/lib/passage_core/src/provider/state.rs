//! CSRF `state` values handed out with consent URLs.

use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::Engine;
use dashmap::DashMap;
use rand::RngCore;

/// TTL for pending state entries (10 minutes).
const STATE_TTL: Duration = Duration::from_secs(600);

/// Generate a random URL-safe state parameter.
pub fn generate_state() -> String {
    let mut bytes = [0u8; 24];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// In-memory store of issued states, each redeemable once.
pub struct OAuthStateStore {
    states: DashMap<String, Instant>,
    ttl: Duration,
}

impl OAuthStateStore {
    pub fn new() -> Self {
        Self::with_ttl(STATE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            states: DashMap::new(),
            ttl,
        }
    }

    /// Generate and remember a fresh state.
    pub fn issue(&self) -> String {
        let state = generate_state();
        self.states.insert(state.clone(), Instant::now());
        state
    }

    /// Consume a state. Returns `false` if unknown, already used, or expired.
    pub fn take(&self, state: &str) -> bool {
        match self.states.remove(state) {
            Some((_, issued_at)) => issued_at.elapsed() <= self.ttl,
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Evict expired entries.
    pub fn cleanup(&self) {
        let ttl = self.ttl;
        self.states.retain(|_, issued_at| issued_at.elapsed() <= ttl);
    }

    /// Spawn a periodic cleanup task.
    pub fn spawn_cleanup_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                store.cleanup();
            }
        })
    }
}

impl Default for OAuthStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_states_are_unique_and_url_safe() {
        let a = generate_state();
        let b = generate_state();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn issued_state_is_single_use() {
        let store = OAuthStateStore::new();
        let state = store.issue();
        assert!(store.take(&state));
        assert!(!store.take(&state));
    }

    #[test]
    fn unknown_state_is_rejected() {
        assert!(!OAuthStateStore::new().take("forged"));
    }

    #[test]
    fn expired_state_is_rejected() {
        let store = OAuthStateStore::with_ttl(Duration::ZERO);
        let state = store.issue();
        std::thread::sleep(Duration::from_millis(5));
        assert!(!store.take(&state));
    }

    #[test]
    fn cleanup_evicts_expired() {
        let store = OAuthStateStore::with_ttl(Duration::ZERO);
        store.issue();
        store.issue();
        std::thread::sleep(Duration::from_millis(5));
        store.cleanup();
        assert!(store.is_empty());
    }
}
