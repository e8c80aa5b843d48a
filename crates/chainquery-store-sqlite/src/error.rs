//! Error type for `chainquery-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("failed to create storage directory: {0}")]
  Io(#[from] std::io::Error),
}

impl From<Error> for chainquery_core::Error {
  fn from(err: Error) -> Self { chainquery_core::Error::storage(err) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
