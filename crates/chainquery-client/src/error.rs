//! Client error type.

use reqwest::StatusCode;
use thiserror::Error;

/// Every way an API operation can fail. None of them is retried.
#[derive(Debug, Error)]
pub enum ClientError {
  /// The request never produced a response (connect, timeout, decode).
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),

  /// The server answered with a non-2xx status.
  #[error("{message} ({status})")]
  Status { status: StatusCode, message: String },

  /// The server answered 2xx but reported a failed generation.
  #[error("{0}")]
  Generation(String),

  #[error(transparent)]
  Core(#[from] chainquery_core::Error),
}

impl ClientError {
  /// Text suitable for an inline alert or notification.
  pub fn user_message(&self) -> String {
    match self {
      Self::Status { message, .. } | Self::Generation(message) => message.clone(),
      other => other.to_string(),
    }
  }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
