use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::models::{Session, UserProfile};

// Fixed storage keys, matching the persisted layout the rest of the product
// expects. Changing these invalidates every existing session cache.
const ACCESS_TOKEN_KEY: &str = "accessToken";
const REFRESH_TOKEN_KEY: &str = "refreshToken";
const USER_KEY: &str = "user";

// 1. KeyValueStore Contract

/// KeyValueStore
///
/// Abstract contract for the origin-scoped string key-value storage the
/// session lives in. All operations are synchronous; the store is only ever
/// touched from one logical task at a time, so implementations need interior
/// mutability but no ordering guarantees beyond call order.
///
/// Swapping the concrete implementation (file-backed in the shell, in-memory
/// in tests) never affects the `SessionStore` contract.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// The shared handle the rest of the crate passes around.
pub type KeyValueState = Arc<dyn KeyValueStore>;

// 2. In-Memory Implementation

/// MemoryStore
///
/// HashMap-backed store used by tests and by shells that keep sessions for the
/// lifetime of the process only.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}

// 3. File-Backed Implementation

/// FileStore
///
/// Persists the key-value map as a single JSON document on disk, giving the
/// desktop shell the same durable session cache a browser origin store
/// provides. Every mutation rewrites the document.
///
/// Read failures (missing file, unreadable JSON) degrade to an empty map: a
/// corrupt cache is equivalent to an absent cache, never a crash.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "session file unreadable, starting empty");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn flush(&self, entries: &HashMap<String, String>) {
        match serde_json::to_string_pretty(entries) {
            Ok(raw) => {
                if let Err(e) = std::fs::write(&self.path, raw) {
                    tracing::error!(path = %self.path.display(), error = %e, "failed to persist session file");
                }
            }
            Err(e) => tracing::error!(error = %e, "failed to serialize session file"),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
            self.flush(&entries);
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
            self.flush(&entries);
        }
    }
}

// 4. Typed Session Access

/// SessionStore
///
/// Typed access to the persisted session over the three fixed keys. The write
/// order is token, then user, then refresh token, inside one synchronous call,
/// so no reader ever observes a token without its matching profile.
#[derive(Clone)]
pub struct SessionStore {
    store: KeyValueState,
}

impl SessionStore {
    pub fn new(store: KeyValueState) -> Self {
        Self { store }
    }

    /// get
    ///
    /// Reads the full session. Returns `None` when the token is absent, and
    /// also when the cached profile is missing or fails to deserialize: a
    /// corrupt cache behaves exactly like no cache. The corrupt record is
    /// logged and left for `clear()` to remove on the next transition.
    pub fn get(&self) -> Option<Session> {
        let token = self.store.get(ACCESS_TOKEN_KEY)?;
        if token.is_empty() {
            return None;
        }
        let raw_user = self.store.get(USER_KEY)?;
        let user: UserProfile = match serde_json::from_str(&raw_user) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "cached user profile unreadable, treating as no session");
                return None;
            }
        };
        Some(Session {
            token,
            refresh_token: self.store.get(REFRESH_TOKEN_KEY),
            user,
        })
    }

    /// set
    ///
    /// Writes all three keys. Ordered token, user, refresh within this one
    /// synchronous call, which is what makes the write atomic from the
    /// perspective of any code reading immediately after.
    pub fn set(&self, token: &str, refresh_token: Option<&str>, user: &UserProfile) {
        self.store.set(ACCESS_TOKEN_KEY, token);
        match serde_json::to_string(user) {
            Ok(raw) => self.store.set(USER_KEY, &raw),
            Err(e) => tracing::error!(error = %e, "failed to serialize user profile"),
        }
        match refresh_token {
            Some(refresh) => self.store.set(REFRESH_TOKEN_KEY, refresh),
            None => self.store.remove(REFRESH_TOKEN_KEY),
        }
    }

    /// clear
    ///
    /// Removes all three keys. Unconditional and infallible from the caller's
    /// perspective.
    pub fn clear(&self) {
        self.store.remove(ACCESS_TOKEN_KEY);
        self.store.remove(USER_KEY);
        self.store.remove(REFRESH_TOKEN_KEY);
    }

    /// token
    ///
    /// The raw stored access token, independent of whether the cached profile
    /// is readable. The hydrator verifies this token remotely even when the
    /// profile cache is corrupt.
    pub fn token(&self) -> Option<String> {
        self.store
            .get(ACCESS_TOKEN_KEY)
            .filter(|t| !t.is_empty())
    }

    /// has_token
    ///
    /// Cheap pre-check used before attempting any remote validation: true iff
    /// an access token is present and non-empty.
    pub fn has_token(&self) -> bool {
        self.store
            .get(ACCESS_TOKEN_KEY)
            .is_some_and(|t| !t.is_empty())
    }
}
