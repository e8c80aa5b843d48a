//! Async HTTP client for the ChainQuery backend.
//!
//! Two resource groups are wrapped: authentication ([`auth`]) and query
//! generation/history ([`queries`]). Every request is composed through
//! [`ApiClient::request`], which attaches the persisted bearer token when one
//! exists. The [`hooks`] module layers caching and mutation state on top.

pub mod auth;
pub mod error;
pub mod hooks;
pub mod queries;
pub mod request;

use std::time::Duration;

use chainquery_core::token::TokenStore;
use reqwest::{Client, Method, RequestBuilder};

pub use error::{ClientError, Result};

/// Base URL of a locally running backend, API prefix included.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api/v1";

/// Connection settings for the ChainQuery API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Base URL including the `/api/v1` prefix.
  pub base_url: String,
  pub timeout:  Duration,
}

impl ApiConfig {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into(),
      timeout:  Duration::from_secs(30),
    }
  }
}

impl Default for ApiConfig {
  fn default() -> Self { Self::new(DEFAULT_API_URL) }
}

/// Async HTTP client for the ChainQuery REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based and the
/// token store shares its storage.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
  tokens: TokenStore,
}

impl ApiClient {
  pub fn new(config: ApiConfig, tokens: TokenStore) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config, tokens })
  }

  pub fn config(&self) -> &ApiConfig { &self.config }

  pub fn tokens(&self) -> &TokenStore { &self.tokens }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Start a request to `path` (relative to the API base) with the bearer
  /// token attached if one is persisted.
  pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
    request::authorized(self.client.request(method, self.url(path)), &self.tokens)
  }
}
