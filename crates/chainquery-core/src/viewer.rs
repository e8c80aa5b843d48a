//! Helpers behind the SQL viewer and the history sidebar.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Query-creation page of the external query builder.
pub const DUNE_NEW_QUERY_URL: &str = "https://dune.com/queries/new";

/// Longest history label shown in the sidebar before truncation.
pub const HISTORY_LABEL_MAX: usize = 28;

/// Shown when a generation fails without a server-provided message.
pub const GENERATION_FAILED: &str = "Failed to generate SQL. Please try again.";

/// Characters left unescaped by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
  .remove(b'-')
  .remove(b'_')
  .remove(b'.')
  .remove(b'!')
  .remove(b'~')
  .remove(b'*')
  .remove(b'\'')
  .remove(b'(')
  .remove(b')');

/// Link that opens `sql` in a new Dune query.
pub fn dune_url(sql: &str) -> String {
  format!(
    "{DUNE_NEW_QUERY_URL}?query={}",
    utf8_percent_encode(sql, URI_COMPONENT)
  )
}

/// Cut `text` to `max` characters, appending `...` when anything was removed.
pub fn truncate_label(text: &str, max: usize) -> String {
  match text.char_indices().nth(max) {
    Some((cut, _)) => format!("{}...", &text[..cut]),
    None => text.to_owned(),
  }
}
