use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

// --- Cache Key Scheme ---

/// Key under which the registration flow caches the visitor's session token.
pub const SESSION_TOKEN_KEY: &str = "tks";

/// Prefix composed with the session token to address the cached user record.
pub const USER_RECORD_KEY_PREFIX: &str = "userInfo_";

/// user_record_key
///
/// Composes the cache key addressing the user record for `token`. An empty
/// token is not special-cased: it yields the literal key `userInfo_`, which is
/// exactly the key the registration flow would have written under an empty
/// token.
pub fn user_record_key(token: &str) -> String {
    format!("{}{}", USER_RECORD_KEY_PREFIX, token)
}

// 1. IdentityStore Contract
/// IdentityStore
///
/// Defines the abstract, read-only contract for the visitor identity cache.
/// The guard never writes: registration owns the keys, the guard only observes
/// them. Keeping the trait read-only makes that one-way dependency explicit
/// and lets tests seed whatever cache shape a scenario needs.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn IdentityStore>`) safely shareable across Axum's asynchronous
/// task boundaries.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Returns the raw string stored under `key`, if any. No parsing happens
    /// at this layer; callers decide what the value means.
    async fn get(&self, key: &str) -> Option<String>;
}

// 2. The In-Memory Implementation (Local Runs + Tests)
/// InMemoryIdentityStore
///
/// A HashMap-backed store. Because the guard only reads, the map is fixed at
/// construction time and needs no interior locking.
#[derive(Clone, Default)]
pub struct InMemoryIdentityStore {
    entries: HashMap<String, String>,
}

impl InMemoryIdentityStore {
    /// An empty cache: no token, no record, every visitor is unregistered.
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache pre-seeded with the given key/value pairs.
    pub fn from_entries(entries: &[(&str, &str)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

/// IdentityState
///
/// The concrete type used to share identity store access across the application state.
pub type IdentityState = Arc<dyn IdentityStore>;
