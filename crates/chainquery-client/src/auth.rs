//! `/auth` endpoints and token lifecycle.

use chainquery_core::{
  query::{AuthResponse, LoginForm, SignupRequest},
  route::{Navigator, Route},
};
use reqwest::Method;

use crate::{ApiClient, Result, request::send_json};

impl ApiClient {
  /// `POST /auth/login` (form-encoded). Persists the returned token.
  pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
    let req = self.request(Method::POST, "/auth/login")?.form(&LoginForm {
      username: email,
      password,
    });
    let resp: AuthResponse = send_json(req, "POST /auth/login").await?;
    self.tokens.set(&resp.access_token)?;
    tracing::info!("logged in");
    Ok(resp)
  }

  /// `POST /auth/signup` (JSON). Persists the returned token.
  pub async fn signup(
    &self,
    email: &str,
    password: &str,
    full_name: Option<&str>,
  ) -> Result<AuthResponse> {
    let req = self
      .request(Method::POST, "/auth/signup")?
      .json(&SignupRequest { email, password, full_name });
    let resp: AuthResponse = send_json(req, "POST /auth/signup").await?;
    self.tokens.set(&resp.access_token)?;
    tracing::info!("signed up");
    Ok(resp)
  }

  /// Forget the token and hard-navigate to the login route, discarding all
  /// client state.
  pub fn logout<N>(&self, navigator: &mut N) -> Result<()>
  where
    N: Navigator + ?Sized,
  {
    self.tokens.clear()?;
    tracing::info!("logged out");
    navigator.hard_navigate(Route::Login);
    Ok(())
  }
}
