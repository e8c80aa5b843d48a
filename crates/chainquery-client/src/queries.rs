//! `/generate` and `/history` endpoints.

use chainquery_core::query::{GenerateRequest, HistoryParams, QueryRecord};
use reqwest::Method;

use crate::{ApiClient, Result, request::send_json};

impl ApiClient {
  /// `POST /generate`
  ///
  /// Returns the record as sent by the server. A populated `error_message`
  /// is *not* turned into an error here; see
  /// [`GenerateMutation`](crate::hooks::GenerateMutation).
  pub async fn generate(
    &self,
    user_input: &str,
    chain: &str,
    session_id: &str,
  ) -> Result<QueryRecord> {
    let req = self.request(Method::POST, "/generate")?.json(&GenerateRequest {
      user_input,
      chain,
      session_id,
    });
    send_json(req, "POST /generate").await
  }

  /// `GET /history?session_id=<id>&limit=<n>`
  pub async fn get_history(&self, session_id: &str, limit: usize) -> Result<Vec<QueryRecord>> {
    let req = self
      .request(Method::GET, "/history")?
      .query(&HistoryParams { session_id, limit });
    send_json(req, "GET /history").await
  }
}
