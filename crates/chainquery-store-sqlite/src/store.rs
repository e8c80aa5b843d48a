//! [`SqliteStorage`], the SQLite implementation of [`Storage`].

use std::{
  path::Path,
  sync::{Mutex, MutexGuard, PoisonError},
};

use chainquery_core::storage::Storage;
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::{Result, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Client storage backed by a single SQLite file.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open (or create) a store at `path`, creating parent directories as
  /// needed, and run schema initialisation.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    tracing::debug!(path = %path.display(), "opened client storage");
    Self::init(conn)
  }

  /// Open an in-memory store.
  pub fn open_in_memory() -> Result<Self> { Self::init(Connection::open_in_memory()?) }

  fn init(conn: Connection) -> Result<Self> {
    conn.execute_batch(SCHEMA)?;
    Ok(Self { conn: Mutex::new(conn) })
  }

  fn conn(&self) -> MutexGuard<'_, Connection> {
    self.conn.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn read(&self, key: &str) -> Result<Option<String>> {
    let value = self
      .conn()
      .query_row(
        "SELECT value FROM entries WHERE key = ?1",
        params![key],
        |row| row.get(0),
      )
      .optional()?;
    Ok(value)
  }

  fn write(&self, key: &str, value: &str) -> Result<()> {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
    self.conn().execute(
      "INSERT INTO entries (key, value, updated_at) VALUES (?1, ?2, ?3)
       ON CONFLICT(key) DO UPDATE SET
         value = excluded.value,
         updated_at = excluded.updated_at",
      params![key, value, now],
    )?;
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<()> {
    self
      .conn()
      .execute("DELETE FROM entries WHERE key = ?1", params![key])?;
    Ok(())
  }
}

// ─── Storage impl ────────────────────────────────────────────────────────────

impl Storage for SqliteStorage {
  fn get(&self, key: &str) -> chainquery_core::Result<Option<String>> {
    Ok(self.read(key)?)
  }

  fn set(&self, key: &str, value: &str) -> chainquery_core::Result<()> {
    tracing::debug!(key, "storage write");
    Ok(self.write(key, value)?)
  }

  fn delete(&self, key: &str) -> chainquery_core::Result<()> {
    tracing::debug!(key, "storage delete");
    Ok(self.remove(key)?)
  }
}
