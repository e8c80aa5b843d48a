//! Client routes and the navigation seam.

use strum::{AsRefStr, Display};

/// Every screen the client can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Route {
  Landing,
  Login,
  Signup,
  Dashboard,
  Debug,
}

impl Route {
  /// Path the route is mounted at.
  pub fn path(self) -> &'static str {
    match self {
      Self::Landing => "/",
      Self::Login => "/login",
      Self::Signup => "/signup",
      Self::Dashboard => "/dashboard",
      Self::Debug => "/debug",
    }
  }
}

/// Something that can move the client to another route.
pub trait Navigator {
  /// Switch routes, keeping client state.
  fn navigate(&mut self, route: Route);

  /// Switch routes and discard all in-memory client state.
  fn hard_navigate(&mut self, route: Route) { self.navigate(route); }
}

/// A navigation request, as recorded by the `Vec` navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
  Soft(Route),
  Hard(Route),
}

/// Records navigation requests instead of acting on them; used by the
/// one-shot CLI commands, which have no screens to switch.
impl Navigator for Vec<Navigation> {
  fn navigate(&mut self, route: Route) { self.push(Navigation::Soft(route)); }

  fn hard_navigate(&mut self, route: Route) {
    self.push(Navigation::Hard(route));
  }
}
