//! SQLite backend for ChainQuery client storage.
//!
//! Implements [`chainquery_core::storage::Storage`] over a single key/value
//! table. Access is synchronous; the connection sits behind a mutex so one
//! store can be shared across the session, token store and API client.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStorage;
