//! Cached history reads and the generation mutation.
//!
//! [`HistoryQuery`] keeps one cached history list per session identifier.
//! [`GenerateMutation`] runs a generation, tracks its status, and invalidates
//! every cached history list once the server has accepted a generation, so
//! the next history read refetches.

use std::{
  collections::HashMap,
  time::{Duration, Instant},
};

use chainquery_core::{
  query::{DEFAULT_HISTORY_LIMIT, QueryRecord},
  session::SessionIdentity,
  viewer::GENERATION_FAILED,
};

use crate::{ApiClient, ClientError, Result};

/// How long a fetched history list is served without refetching.
pub const HISTORY_CACHE_LIFETIME: Duration = Duration::from_secs(5 * 60);

// ─── History ─────────────────────────────────────────────────────────────────

struct CachedHistory {
  records:    Vec<QueryRecord>,
  fetched_at: Instant,
  stale:      bool,
}

/// History list cache keyed by session identifier.
pub struct HistoryQuery {
  entries:    HashMap<String, CachedHistory>,
  active_key: Option<String>,
  limit:      usize,
  lifetime:   Duration,
}

impl Default for HistoryQuery {
  fn default() -> Self { Self::new(DEFAULT_HISTORY_LIMIT) }
}

impl HistoryQuery {
  pub fn new(limit: usize) -> Self {
    Self {
      entries: HashMap::new(),
      active_key: None,
      limit,
      lifetime: HISTORY_CACHE_LIFETIME,
    }
  }

  /// Override the cache lifetime.
  pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
    self.lifetime = lifetime;
    self
  }

  pub fn limit(&self) -> usize { self.limit }

  /// Read the history for the current session.
  ///
  /// Returns `Ok(None)` without touching the network when no session
  /// identifier exists. Serves the cached list while it is fresh; otherwise
  /// refetches.
  pub async fn fetch(
    &mut self,
    client: &ApiClient,
    session: &SessionIdentity,
  ) -> Result<Option<&[QueryRecord]>> {
    let Some(session_id) = session.get_session_id()? else {
      tracing::debug!("history disabled: no session identifier");
      self.active_key = None;
      return Ok(None);
    };

    if self.is_fresh(&session_id) {
      tracing::debug!(%session_id, "history cache hit");
    } else {
      tracing::debug!(%session_id, "history cache miss");
      let records = client.get_history(&session_id, self.limit).await?;
      self.entries.insert(session_id.clone(), CachedHistory {
        records,
        fetched_at: Instant::now(),
        stale: false,
      });
    }

    self.active_key = Some(session_id);
    Ok(self.current())
  }

  fn is_fresh(&self, session_id: &str) -> bool {
    self
      .entries
      .get(session_id)
      .is_some_and(|e| !e.stale && e.fetched_at.elapsed() < self.lifetime)
  }

  /// The list for the session last passed through [`fetch`](Self::fetch),
  /// stale or not.
  pub fn current(&self) -> Option<&[QueryRecord]> {
    let key = self.active_key.as_ref()?;
    self.entries.get(key).map(|e| e.records.as_slice())
  }

  /// Cached list for a specific session, stale or not.
  pub fn cached(&self, session_id: &str) -> Option<&[QueryRecord]> {
    self.entries.get(session_id).map(|e| e.records.as_slice())
  }

  pub fn is_stale(&self, session_id: &str) -> bool { !self.is_fresh(session_id) }

  /// Mark every cached list stale. Data stays visible until refetched.
  pub fn invalidate_all(&mut self) {
    tracing::debug!(entries = self.entries.len(), "invalidating history cache");
    for entry in self.entries.values_mut() {
      entry.stale = true;
    }
  }

  /// Drop everything, including the data.
  pub fn clear(&mut self) {
    self.entries.clear();
    self.active_key = None;
  }
}

// ─── Generation ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStatus {
  Idle,
  Pending,
  Success,
  Error,
}

/// State of the most recent generation.
#[derive(Debug, Clone)]
pub struct GenerateMutation {
  status: MutationStatus,
  data:   Option<QueryRecord>,
  error:  Option<String>,
}

impl Default for GenerateMutation {
  fn default() -> Self {
    Self {
      status: MutationStatus::Idle,
      data:   None,
      error:  None,
    }
  }
}

impl GenerateMutation {
  pub fn status(&self) -> MutationStatus { self.status }

  pub fn is_pending(&self) -> bool { self.status == MutationStatus::Pending }

  pub fn is_error(&self) -> bool { self.status == MutationStatus::Error }

  pub fn data(&self) -> Option<&QueryRecord> { self.data.as_ref() }

  /// Message for the error alert, if the last generation failed.
  pub fn error(&self) -> Option<&str> { self.error.as_deref() }

  /// Mark the mutation as in flight so the UI can render it before the
  /// request is awaited.
  pub fn start(&mut self) {
    self.status = MutationStatus::Pending;
    self.error = None;
  }

  pub fn reset(&mut self) { *self = Self::default(); }

  /// Generate SQL for `input`.
  ///
  /// Ensures a session identifier exists first. A server-reported
  /// `error_message` is returned as [`ClientError::Generation`]; the history
  /// cache is invalidated in that case too because the server has stored the
  /// attempt.
  pub async fn run(
    &mut self,
    client: &ApiClient,
    session: &SessionIdentity,
    history: &mut HistoryQuery,
    input: &str,
    chain: &str,
  ) -> Result<QueryRecord> {
    self.start();
    match Self::execute(client, session, history, input, chain).await {
      Ok(record) => {
        tracing::info!(id = %record.id, "generated SQL");
        self.status = MutationStatus::Success;
        self.data = Some(record.clone());
        Ok(record)
      }
      Err(e) => {
        let message = match e.user_message() {
          m if m.is_empty() => GENERATION_FAILED.to_owned(),
          m => m,
        };
        tracing::warn!("generation failed: {message}");
        self.status = MutationStatus::Error;
        self.error = Some(message);
        Err(e)
      }
    }
  }

  async fn execute(
    client: &ApiClient,
    session: &SessionIdentity,
    history: &mut HistoryQuery,
    input: &str,
    chain: &str,
  ) -> Result<QueryRecord> {
    let session_id = session.ensure_session_id()?;
    let record = client.generate(input, chain, &session_id).await?;
    history.invalidate_all();
    if let Some(message) = &record.error_message {
      return Err(ClientError::Generation(message.clone()));
    }
    Ok(record)
  }
}
