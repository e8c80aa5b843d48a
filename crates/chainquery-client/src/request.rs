//! Request composition and response checking shared by every endpoint.

use chainquery_core::token::TokenStore;
use reqwest::{RequestBuilder, Response, header::AUTHORIZATION};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{ClientError, Result};

/// Attach `Authorization: Bearer <token>` when a token is persisted; leave
/// the request untouched otherwise.
pub fn authorized(req: RequestBuilder, tokens: &TokenStore) -> Result<RequestBuilder> {
  Ok(match tokens.bearer()? {
    Some(value) => req.header(AUTHORIZATION, value),
    None => req,
  })
}

/// Error body shape used by the backend (`{"detail": ...}`).
#[derive(Deserialize)]
struct ErrorBody {
  detail: Value,
}

/// Send `req` and decode a JSON body, turning non-2xx statuses into
/// [`ClientError::Status`]. `what` names the call in logs.
pub(crate) async fn send_json<T: DeserializeOwned>(
  req: RequestBuilder,
  what: &str,
) -> Result<T> {
  let resp = req.send().await.inspect_err(|e| {
    tracing::warn!("{what} failed: {e}");
  })?;
  let resp = check_status(resp, what).await?;
  Ok(resp.json().await?)
}

async fn check_status(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let body = resp.text().await.unwrap_or_default();
  let message = error_message(&body).unwrap_or_else(|| {
    status
      .canonical_reason()
      .unwrap_or("request failed")
      .to_owned()
  });
  tracing::warn!(%status, "{what} → {message}");
  Err(ClientError::Status { status, message })
}

/// Extract a human-readable message from an error body.
///
/// `detail` is usually a string; validation failures carry a list of objects
/// with a `msg` field.
fn error_message(body: &str) -> Option<String> {
  let parsed: ErrorBody = serde_json::from_str(body).ok()?;
  match parsed.detail {
    Value::String(s) => Some(s),
    Value::Array(items) => {
      let msgs: Vec<&str> = items
        .iter()
        .filter_map(|item| item.get("msg").and_then(Value::as_str))
        .collect();
      (!msgs.is_empty()).then(|| msgs.join("; "))
    }
    _ => None,
  }
}
