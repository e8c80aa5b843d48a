//! Application state machine and event dispatcher.
//!
//! Key handling is synchronous. Anything that needs the network is queued as
//! an [`Action`] and performed by [`App::run_pending`], which the event loop
//! calls after drawing, so a "pending" frame is always shown first.

use std::{rc::Rc, sync::Arc, time::Duration};

use chainquery_client::{
  ApiClient,
  hooks::{GenerateMutation, HistoryQuery},
};
use chainquery_core::{
  animation::{Clock, LANDING_EXAMPLES, SystemClock, TerminalAnimation, placeholder_at},
  query::QueryRecord,
  route::{Navigator, Route},
  session::{SessionIdentity, UserMode},
  viewer::dune_url,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};

use crate::external::{Browser, Clipboard, Osc52Clipboard, SystemBrowser};

/// How long a notification stays on screen.
pub const TOAST_LIFETIME: Duration = Duration::from_secs(3);

/// Example questions offered under the empty query input, bound to F1–F4.
pub const EXAMPLE_CHIPS: [&str; 4] = [
  "Top 10 SOL holders",
  "Daily DEX volume",
  "NFT sales today",
  "Token transfers",
];

// ─── Landing ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingAction {
  SignIn,
  SignUp,
  TryDemo,
}

impl LandingAction {
  pub const ALL: [Self; 3] = [Self::SignIn, Self::SignUp, Self::TryDemo];

  pub fn label(self) -> &'static str {
    match self {
      Self::SignIn => "Sign in",
      Self::SignUp => "Sign up",
      Self::TryDemo => "Try demo (no login)",
    }
  }
}

// ─── Auth form ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthField {
  FullName,
  #[default]
  Email,
  Password,
}

impl AuthField {
  pub fn label(self) -> &'static str {
    match self {
      Self::FullName => "Full name",
      Self::Email => "Email",
      Self::Password => "Password",
    }
  }
}

/// Fields of the login and signup forms.
#[derive(Debug, Default)]
pub struct AuthForm {
  pub email:      String,
  pub password:   String,
  pub full_name:  String,
  pub field:      AuthField,
  pub error:      Option<String>,
  pub submitting: bool,
}

impl AuthForm {
  /// Fields shown on `route`, top to bottom.
  pub fn fields(route: Route) -> &'static [AuthField] {
    match route {
      Route::Signup => &[AuthField::FullName, AuthField::Email, AuthField::Password],
      _ => &[AuthField::Email, AuthField::Password],
    }
  }

  pub fn value(&self, field: AuthField) -> &str {
    match field {
      AuthField::FullName => &self.full_name,
      AuthField::Email => &self.email,
      AuthField::Password => &self.password,
    }
  }

  fn value_mut(&mut self, field: AuthField) -> &mut String {
    match field {
      AuthField::FullName => &mut self.full_name,
      AuthField::Email => &mut self.email,
      AuthField::Password => &mut self.password,
    }
  }

  fn cycle(&mut self, route: Route, forward: bool) {
    let fields = Self::fields(route);
    let pos = fields.iter().position(|f| *f == self.field).unwrap_or(0);
    let next = if forward {
      (pos + 1) % fields.len()
    } else {
      (pos + fields.len() - 1) % fields.len()
    };
    self.field = fields[next];
  }
}

// ─── Dashboard ────────────────────────────────────────────────────────────────

/// Keyboard focus within the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  Input,
  History,
  Viewer,
}

/// Network work queued by a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  Login,
  Signup,
  Generate,
  LoadHistory,
}

#[derive(Debug, Clone)]
pub struct Toast {
  pub message: String,
  expires_at:  Duration,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub route: Route,

  // Landing
  pub landing_cursor: usize,
  pub animation:      TerminalAnimation,

  // Login / signup
  pub form:       AuthForm,
  pub user_email: Option<String>,

  // Dashboard
  pub sidebar_collapsed: bool,
  pub focus:             Focus,
  pub history_cursor:    usize,
  pub filter:            String,
  pub filter_active:     bool,
  pub input:             String,
  pub generated_sql:     String,
  pub viewer_scroll:     u16,
  pub mutation:          GenerateMutation,
  pub history:           HistoryQuery,
  pub history_error:     Option<String>,
  pub chain:             String,

  toast:           Option<Toast>,
  pending:         Option<Action>,
  input_shown_at:  Duration,
  session:         SessionIdentity,
  client:          Arc<ApiClient>,
  clock:           Rc<dyn Clock>,
  clipboard:       Box<dyn Clipboard>,
  browser:         Box<dyn Browser>,
}

impl App {
  /// Create an [`App`] on the landing route.
  pub fn new(
    client: ApiClient,
    session: SessionIdentity,
    chain: impl Into<String>,
    history_limit: usize,
  ) -> Self {
    let clock: Rc<dyn Clock> = Rc::new(SystemClock::new());
    let now = clock.now();
    Self {
      route: Route::Landing,
      landing_cursor: 0,
      animation: TerminalAnimation::new(LANDING_EXAMPLES, now),
      form: AuthForm::default(),
      user_email: None,
      sidebar_collapsed: false,
      focus: Focus::Input,
      history_cursor: 0,
      filter: String::new(),
      filter_active: false,
      input: String::new(),
      generated_sql: String::new(),
      viewer_scroll: 0,
      mutation: GenerateMutation::default(),
      history: HistoryQuery::new(history_limit),
      history_error: None,
      chain: chain.into(),
      toast: None,
      pending: None,
      input_shown_at: now,
      session,
      client: Arc::new(client),
      clock,
      clipboard: Box::new(Osc52Clipboard),
      browser: Box::new(SystemBrowser),
    }
  }

  /// Replace the time source; restarts the landing animation against it.
  pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
    let now = clock.now();
    self.animation = TerminalAnimation::new(LANDING_EXAMPLES, now);
    self.input_shown_at = now;
    self.clock = clock;
    self
  }

  pub fn with_clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
    self.clipboard = clipboard;
    self
  }

  pub fn with_browser(mut self, browser: Box<dyn Browser>) -> Self {
    self.browser = browser;
    self
  }

  // ── Derived state ─────────────────────────────────────────────────────────

  /// Whether the split input/result layout is shown instead of the hero.
  pub fn has_result(&self) -> bool {
    !self.generated_sql.is_empty() || self.mutation.is_pending()
  }

  /// Placeholder for the empty query input, rotating every few seconds.
  pub fn placeholder(&self) -> &'static str {
    placeholder_at(self.clock.now().saturating_sub(self.input_shown_at))
  }

  /// Cached history for the current session, stale or not.
  pub fn history_records(&self) -> &[QueryRecord] { self.history.current().unwrap_or_default() }

  /// History entries that match the current filter.
  pub fn visible_history(&self) -> Vec<&QueryRecord> {
    let records = self.history_records();
    if self.filter.is_empty() {
      return records.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    records
      .iter()
      .filter(|r| matcher.fuzzy_match(&r.user_input, &self.filter).is_some())
      .collect()
  }

  pub fn toast(&self) -> Option<&Toast> { self.toast.as_ref() }

  pub fn pending(&self) -> Option<Action> { self.pending }

  /// Label for the navbar user indicator.
  pub fn user_label(&self) -> String {
    if let Some(email) = &self.user_email {
      return email.clone();
    }
    match self.session.user_mode(self.client.tokens()) {
      Ok(Some(UserMode::Authenticated)) => "Signed in".into(),
      Ok(Some(UserMode::Guest)) => "Guest".into(),
      Ok(None) => "Not signed in".into(),
      Err(e) => {
        tracing::warn!("reading user mode failed: {e}");
        "Unknown".into()
      }
    }
  }

  // ── Timers ────────────────────────────────────────────────────────────────

  /// Advance time-driven state: the landing animation and toast expiry.
  pub fn tick(&mut self) {
    let now = self.clock.now();
    if self.route == Route::Landing {
      self.animation.advance_to(now);
    }
    if self.toast.as_ref().is_some_and(|t| t.expires_at <= now) {
      self.toast = None;
    }
  }

  /// Show a transient notification.
  pub fn notify(&mut self, message: impl Into<String>) {
    self.toast = Some(Toast {
      message:    message.into(),
      expires_at: self.clock.now() + TOAST_LIFETIME,
    });
  }

  // ── Network actions ───────────────────────────────────────────────────────

  /// Perform the queued action, if any. Failures are recorded in state for
  /// the next frame; none of them ends the app.
  pub async fn run_pending(&mut self) {
    let Some(action) = self.pending.take() else {
      return;
    };
    tracing::debug!(?action, "running action");
    match action {
      Action::Login => self.submit_login().await,
      Action::Signup => self.submit_signup().await,
      Action::Generate => self.generate().await,
      Action::LoadHistory => self.load_history().await,
    }
  }

  async fn submit_login(&mut self) {
    let result = self
      .client
      .login(self.form.email.trim(), &self.form.password)
      .await
      .map(drop);
    self.finish_auth(result);
  }

  async fn submit_signup(&mut self) {
    let full_name = Some(self.form.full_name.trim()).filter(|n| !n.is_empty());
    let result = self
      .client
      .signup(self.form.email.trim(), &self.form.password, full_name)
      .await
      .map(drop);
    self.finish_auth(result);
  }

  fn finish_auth(&mut self, result: chainquery_client::Result<()>) {
    self.form.submitting = false;
    match result {
      Ok(()) => {
        self.user_email = Some(self.form.email.trim().to_owned());
        self.navigate(Route::Dashboard);
      }
      Err(e) => self.form.error = Some(e.user_message()),
    }
  }

  async fn generate(&mut self) {
    let input = self.input.clone();
    let result = self
      .mutation
      .run(&self.client, &self.session, &mut self.history, &input, &self.chain)
      .await;
    if let Ok(record) = result {
      self.generated_sql = record.sql().to_owned();
      self.viewer_scroll = 0;
    }
    // A failure reported by the server was still recorded in its history.
    self.pending = Some(Action::LoadHistory);
  }

  async fn load_history(&mut self) {
    let result = self
      .history
      .fetch(&self.client, &self.session)
      .await
      .map(|records| records.map_or(0, <[_]>::len));
    match result {
      Ok(_) => {
        self.history_error = None;
        self.clamp_history_cursor();
      }
      Err(e) => {
        tracing::warn!("loading history failed: {e}");
        self.history_error = Some(e.user_message());
      }
    }
  }

  fn clamp_history_cursor(&mut self) {
    let len = self.visible_history().len();
    self.history_cursor = self.history_cursor.min(len.saturating_sub(1));
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    match self.route {
      Route::Landing => self.handle_landing_key(key),
      Route::Login | Route::Signup => Ok(self.handle_form_key(key)),
      Route::Dashboard | Route::Debug => self.handle_dashboard_key(key),
    }
  }

  fn handle_landing_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    let count = LandingAction::ALL.len();
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => return Ok(false),
      KeyCode::Left | KeyCode::Up | KeyCode::BackTab => {
        self.landing_cursor = (self.landing_cursor + count - 1) % count;
      }
      KeyCode::Right | KeyCode::Down | KeyCode::Tab => {
        self.landing_cursor = (self.landing_cursor + 1) % count;
      }
      KeyCode::Enter => self.activate(LandingAction::ALL[self.landing_cursor])?,
      KeyCode::Char('l') => self.activate(LandingAction::SignIn)?,
      KeyCode::Char('s') => self.activate(LandingAction::SignUp)?,
      KeyCode::Char('d') => self.activate(LandingAction::TryDemo)?,
      _ => {}
    }
    Ok(true)
  }

  fn activate(&mut self, action: LandingAction) -> anyhow::Result<()> {
    match action {
      LandingAction::SignIn => self.navigate(Route::Login),
      LandingAction::SignUp => self.navigate(Route::Signup),
      LandingAction::TryDemo => {
        let session = self.session.clone();
        let id = session.handle_guest_access(self)?;
        tracing::info!(session_id = %id, "entered guest mode");
      }
    }
    Ok(())
  }

  fn handle_form_key(&mut self, key: KeyEvent) -> bool {
    if self.form.submitting {
      return true;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Esc => self.navigate(Route::Landing),
      KeyCode::Char('t') if ctrl => {
        let other = if self.route == Route::Login {
          Route::Signup
        } else {
          Route::Login
        };
        self.navigate(other);
      }
      KeyCode::Tab | KeyCode::Down => self.form.cycle(self.route, true),
      KeyCode::BackTab | KeyCode::Up => self.form.cycle(self.route, false),
      KeyCode::Enter => self.submit_form(),
      KeyCode::Backspace => {
        self.form.value_mut(self.form.field).pop();
      }
      KeyCode::Char(c) if !ctrl => self.form.value_mut(self.form.field).push(c),
      _ => {}
    }
    true
  }

  fn submit_form(&mut self) {
    if self.form.email.trim().is_empty() || self.form.password.is_empty() {
      self.form.error = Some("Email and password are required".into());
      return;
    }
    self.form.error = None;
    self.form.submitting = true;
    self.pending = Some(if self.route == Route::Signup {
      Action::Signup
    } else {
      Action::Login
    });
  }

  fn handle_dashboard_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL)
      && let KeyCode::Char(c) = key.code
    {
      self.handle_shortcut(c)?;
      return Ok(true);
    }

    if self.route == Route::Debug {
      match key.code {
        KeyCode::Char('q') => return Ok(false),
        KeyCode::Esc | KeyCode::Backspace => self.navigate(Route::Dashboard),
        _ => {}
      }
      return Ok(true);
    }

    if self.filter_active {
      self.handle_filter_key(key);
      return Ok(true);
    }

    match self.focus {
      Focus::Input => self.handle_input_key(key),
      Focus::History => return Ok(self.handle_history_key(key)),
      Focus::Viewer => return Ok(self.handle_viewer_key(key)),
    }
    Ok(true)
  }

  /// `Ctrl+<c>` shortcuts, available from any dashboard focus.
  fn handle_shortcut(&mut self, c: char) -> anyhow::Result<()> {
    match c {
      'b' => {
        self.sidebar_collapsed = !self.sidebar_collapsed;
        if self.sidebar_collapsed && self.focus == Focus::History {
          self.focus = Focus::Input;
        }
      }
      'n' => self.new_query(),
      'd' => {
        let target = if self.route == Route::Debug {
          Route::Dashboard
        } else {
          Route::Debug
        };
        self.navigate(target);
      }
      'o' => {
        if self.session.is_guest_user()? {
          self.session.clear_guest_session()?;
        }
        let client = Arc::clone(&self.client);
        client.logout(self)?;
      }
      'r' => {
        self.history.invalidate_all();
        self.pending = Some(Action::LoadHistory);
      }
      's' => self.submit_query(),
      'y' => self.copy_sql(),
      'e' => self.open_in_dune(),
      _ => {}
    }
    Ok(())
  }

  fn handle_input_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Enter => self.submit_query(),
      KeyCode::Tab => self.cycle_focus(),
      KeyCode::Esc => {
        self.focus = if !self.sidebar_collapsed {
          Focus::History
        } else {
          Focus::Viewer
        };
      }
      KeyCode::Backspace => {
        self.input.pop();
      }
      KeyCode::F(n @ 1..=4) if !self.has_result() => {
        self.input = EXAMPLE_CHIPS[usize::from(n) - 1].to_owned();
      }
      KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::ALT) => self.input.push(c),
      _ => {}
    }
  }

  fn handle_history_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.visible_history().len();
        if self.history_cursor + 1 < len {
          self.history_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.history_cursor = self.history_cursor.saturating_sub(1);
      }
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => self.select_history(),
      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.history_cursor = 0;
      }
      KeyCode::Char('n') => self.new_query(),
      KeyCode::Tab => self.cycle_focus(),
      KeyCode::Esc | KeyCode::Char('i') => self.focus = Focus::Input,
      _ => {}
    }
    true
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
        self.history_cursor = 0;
      }
      KeyCode::Enter => {
        self.filter_active = false;
        self.history_cursor = 0;
        if self.visible_history().len() == 1 {
          self.select_history();
        }
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.history_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.history_cursor = 0;
      }
      _ => {}
    }
  }

  fn handle_viewer_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Down | KeyCode::Char('j') => {
        let lines = self.generated_sql.lines().count() as u16;
        if self.viewer_scroll + 1 < lines {
          self.viewer_scroll += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.viewer_scroll = self.viewer_scroll.saturating_sub(1);
      }
      KeyCode::Char('g') => self.viewer_scroll = 0,
      KeyCode::Char('y') => self.copy_sql(),
      KeyCode::Char('o') => self.open_in_dune(),
      KeyCode::Tab => self.cycle_focus(),
      KeyCode::Esc | KeyCode::Char('i') => self.focus = Focus::Input,
      _ => {}
    }
    true
  }

  fn cycle_focus(&mut self) {
    let order = [Focus::Input, Focus::History, Focus::Viewer];
    let pos = order.iter().position(|f| *f == self.focus).unwrap_or(0);
    self.focus = order
      .iter()
      .cycle()
      .skip(pos + 1)
      .take(order.len())
      .copied()
      .find(|f| match f {
        Focus::History => !self.sidebar_collapsed,
        Focus::Viewer => !self.generated_sql.is_empty(),
        Focus::Input => true,
      })
      .unwrap_or(Focus::Input);
  }

  // ── Dashboard operations ──────────────────────────────────────────────────

  fn submit_query(&mut self) {
    if self.input.trim().is_empty() || self.mutation.is_pending() {
      return;
    }
    self.mutation.start();
    self.pending = Some(Action::Generate);
  }

  /// Clear the input and the viewer.
  pub fn new_query(&mut self) {
    if self.route == Route::Debug {
      self.navigate(Route::Dashboard);
    }
    self.input.clear();
    self.generated_sql.clear();
    self.viewer_scroll = 0;
    self.mutation.reset();
    self.focus = Focus::Input;
    self.input_shown_at = self.clock.now();
  }

  /// Load the history entry under the cursor into the input and viewer.
  pub fn select_history(&mut self) {
    let Some(record) = self.visible_history().get(self.history_cursor).copied() else {
      return;
    };
    let (input, sql) = (record.user_input.clone(), record.sql().to_owned());
    if self.route == Route::Debug {
      self.navigate(Route::Dashboard);
    }
    self.input = input;
    self.generated_sql = sql;
    self.viewer_scroll = 0;
    self.mutation.reset();
  }

  fn copy_sql(&mut self) {
    if self.generated_sql.is_empty() {
      return;
    }
    match self.clipboard.copy(&self.generated_sql) {
      Ok(()) => self.notify("Copied to clipboard"),
      Err(e) => {
        tracing::warn!("clipboard copy failed: {e}");
        self.notify("Failed to copy");
      }
    }
  }

  fn open_in_dune(&mut self) {
    if self.generated_sql.is_empty() {
      return;
    }
    let url = dune_url(&self.generated_sql);
    match self.browser.open(&url) {
      Ok(()) => self.notify("Opened in Dune"),
      Err(e) => {
        tracing::warn!("opening browser failed: {e}");
        self.notify(format!("Could not open browser: {e}"));
      }
    }
  }

  /// Forget all in-memory state. Persisted storage is untouched.
  fn reset(&mut self) {
    self.form = AuthForm::default();
    self.user_email = None;
    self.sidebar_collapsed = false;
    self.focus = Focus::Input;
    self.history_cursor = 0;
    self.filter.clear();
    self.filter_active = false;
    self.input.clear();
    self.generated_sql.clear();
    self.viewer_scroll = 0;
    self.mutation.reset();
    self.history.clear();
    self.history_error = None;
    self.toast = None;
    self.pending = None;
  }
}

impl Navigator for App {
  fn navigate(&mut self, route: Route) {
    tracing::debug!(from = %self.route, to = %route, "navigate");
    match route {
      Route::Landing => {
        self.landing_cursor = 0;
        self.animation = TerminalAnimation::new(LANDING_EXAMPLES, self.clock.now());
      }
      Route::Login | Route::Signup => self.form = AuthForm::default(),
      Route::Dashboard => {
        if self.route != Route::Debug {
          self.focus = Focus::Input;
          self.input_shown_at = self.clock.now();
        }
        self.pending = Some(Action::LoadHistory);
      }
      Route::Debug => {}
    }
    self.route = route;
  }

  fn hard_navigate(&mut self, route: Route) {
    self.reset();
    self.navigate(route);
  }
}
