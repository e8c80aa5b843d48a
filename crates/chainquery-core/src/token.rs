//! Persistent bearer token bookkeeping.

use crate::{
  Result,
  storage::{AUTH_TOKEN_KEY, SharedStorage},
};

/// Reads and writes the bearer token in client storage.
///
/// Cheap to clone; all clones share the same storage.
#[derive(Clone)]
pub struct TokenStore {
  storage: SharedStorage,
}

impl TokenStore {
  pub fn new(storage: SharedStorage) -> Self { Self { storage } }

  /// The persisted token. An empty stored value counts as no token.
  pub fn get(&self) -> Result<Option<String>> {
    Ok(
      self
        .storage
        .get(AUTH_TOKEN_KEY)?
        .filter(|token| !token.is_empty()),
    )
  }

  pub fn set(&self, token: &str) -> Result<()> {
    tracing::debug!("persisting auth token");
    self.storage.set(AUTH_TOKEN_KEY, token)
  }

  pub fn clear(&self) -> Result<()> {
    tracing::debug!("clearing auth token");
    self.storage.delete(AUTH_TOKEN_KEY)
  }

  pub fn is_authenticated(&self) -> Result<bool> { Ok(self.get()?.is_some()) }

  /// `Authorization` header value for the persisted token, if any.
  pub fn bearer(&self) -> Result<Option<String>> {
    Ok(self.get()?.map(|token| format!("Bearer {token}")))
  }
}
