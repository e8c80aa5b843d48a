//! Wire types exchanged with the ChainQuery backend.
//!
//! Query records are produced server-side and never mutated by the client.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Chain targeted when the caller does not pick one.
pub const DEFAULT_CHAIN: &str = "solana";

/// Number of history records requested when the caller does not pick a limit.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

fn default_chain() -> String { DEFAULT_CHAIN.to_owned() }

// ─── Query records ───────────────────────────────────────────────────────────

/// A natural-language question together with the SQL generated for it.
///
/// Returned both by `POST /generate` and, as a list, by `GET /history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
  pub id:            Uuid,
  pub user_input:    String,
  /// `None` (or empty) when generation failed.
  #[serde(default)]
  pub sql_output:    Option<String>,
  #[serde(deserialize_with = "timestamp::deserialize")]
  pub created_at:    DateTime<Utc>,
  /// Server-reported logical failure. A record carrying one is a failed
  /// generation even though the HTTP exchange succeeded.
  #[serde(default)]
  pub error_message: Option<String>,
  #[serde(default = "default_chain")]
  pub chain:         String,
}

impl QueryRecord {
  /// The generated SQL, or `""` when none was produced.
  pub fn sql(&self) -> &str { self.sql_output.as_deref().unwrap_or_default() }

  pub fn is_failed(&self) -> bool { self.error_message.is_some() }
}

/// Body of `POST /generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
  pub user_input: &'a str,
  pub chain:      &'a str,
  pub session_id: &'a str,
}

/// Query parameters of `GET /history`.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryParams<'a> {
  pub session_id: &'a str,
  pub limit:      usize,
}

// ─── Authentication ──────────────────────────────────────────────────────────

/// Form body of `POST /auth/login` (OAuth2 password flow field names).
#[derive(Debug, Clone, Serialize)]
pub struct LoginForm<'a> {
  pub username: &'a str,
  pub password: &'a str,
}

/// JSON body of `POST /auth/signup`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest<'a> {
  pub email:     &'a str,
  pub password:  &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub full_name: Option<&'a str>,
}

/// Token response returned by both login and signup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
  pub access_token: String,
  pub token_type:   String,
  /// Any additional fields the server chooses to include.
  #[serde(flatten)]
  pub extra:        serde_json::Map<String, serde_json::Value>,
}

// ─── Timestamps ──────────────────────────────────────────────────────────────

/// The backend may emit RFC 3339 timestamps or naive ISO 8601 ones with no
/// offset; naive values are taken to be UTC.
mod timestamp {
  use super::*;

  pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
  where
    D: Deserializer<'de>,
  {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
  }

  pub(super) fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
      Ok(dt) => Ok(dt.with_timezone(&Utc)),
      Err(_) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc()),
    }
  }
}
