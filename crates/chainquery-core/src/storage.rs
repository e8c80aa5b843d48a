//! The `Storage` trait: persistent client-side key/value state.
//!
//! Session identity, user mode and the auth token all live behind this
//! abstraction. The running client uses the SQLite backend from
//! `chainquery-store-sqlite`; tests substitute [`MemoryStorage`].

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError},
};

use crate::Result;

// ─── Keys ────────────────────────────────────────────────────────────────────

/// Key under which the guest session identifier is persisted.
pub const SESSION_KEY: &str = "chainquery_session_id";

/// Key under which the user mode flag (`guest`) is persisted.
pub const USER_MODE_KEY: &str = "user_mode";

/// Key under which the bearer token is persisted.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Synchronous string key/value store.
///
/// Writes are last-write-wins; there is no cross-process coordination.
pub trait Storage: Send + Sync {
  /// Read the value stored under `key`, or `None` if absent.
  fn get(&self, key: &str) -> Result<Option<String>>;

  /// Store `value` under `key`, replacing any previous value.
  fn set(&self, key: &str, value: &str) -> Result<()>;

  /// Remove `key`. Removing an absent key is not an error.
  fn delete(&self, key: &str) -> Result<()>;
}

/// Storage handle shared between the session, token store and API client.
pub type SharedStorage = Arc<dyn Storage>;

// ─── In-memory backend ───────────────────────────────────────────────────────

/// A process-local [`Storage`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
  pub fn new() -> Self { Self::default() }

  /// Convenience constructor returning the store as a [`SharedStorage`].
  pub fn shared() -> SharedStorage { Arc::new(Self::default()) }
}

impl Storage for MemoryStorage {
  fn get(&self, key: &str) -> Result<Option<String>> {
    let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
    Ok(entries.get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> Result<()> {
    let mut entries =
      self.entries.lock().unwrap_or_else(PoisonError::into_inner);
    entries.insert(key.to_owned(), value.to_owned());
    Ok(())
  }

  fn delete(&self, key: &str) -> Result<()> {
    let mut entries =
      self.entries.lock().unwrap_or_else(PoisonError::into_inner);
    entries.remove(key);
    Ok(())
  }
}
