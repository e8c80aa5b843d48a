//! End-to-end tests for the app state machine, rendering and subcommands,
//! driven against a local mock server.

use std::{cell::RefCell, io, path::PathBuf, rc::Rc, time::Duration};

use chainquery_client::{ApiClient, ApiConfig};
use chainquery_core::{
  animation::{ManualClock, PLACEHOLDER_EXAMPLES, Phase},
  route::{Navigator, Route},
  session::{SessionIdentity, is_canonical_session_id},
  storage::{MemoryStorage, SESSION_KEY, SharedStorage, Storage, USER_MODE_KEY},
  token::TokenStore,
  viewer::dune_url,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use mockito::{Matcher, Server, ServerGuard};
use ratatui::{Terminal, backend::TestBackend};
use serde_json::{Value, json};

use crate::{
  app::{Action, App, Focus},
  commands::{self, Command, Context},
  external::{Browser, Clipboard},
  settings::Settings,
  ui,
};

// ─── Fakes ────────────────────────────────────────────────────────────────────

/// Records everything copied or opened.
#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<String>>>);

impl Recorder {
  fn items(&self) -> Vec<String> { self.0.borrow().clone() }
}

impl Clipboard for Recorder {
  fn copy(&mut self, text: &str) -> io::Result<()> {
    self.0.borrow_mut().push(text.to_owned());
    Ok(())
  }
}

impl Browser for Recorder {
  fn open(&mut self, url: &str) -> io::Result<()> {
    self.0.borrow_mut().push(url.to_owned());
    Ok(())
  }
}

struct BrokenClipboard;

impl Clipboard for BrokenClipboard {
  fn copy(&mut self, _text: &str) -> io::Result<()> { Err(io::Error::other("no terminal")) }
}

// ─── Harness ──────────────────────────────────────────────────────────────────

struct Harness {
  server:  ServerGuard,
  storage: SharedStorage,
  clock:   Rc<ManualClock>,
  copied:  Recorder,
  opened:  Recorder,
  app:     App,
}

async fn harness() -> Harness {
  let server = Server::new_async().await;
  let storage = MemoryStorage::shared();
  let client = ApiClient::new(
    ApiConfig::new(format!("{}/api/v1", server.url())),
    TokenStore::new(storage.clone()),
  )
  .unwrap();
  let clock = Rc::new(ManualClock::new());
  let copied = Recorder::default();
  let opened = Recorder::default();
  let app = App::new(client, SessionIdentity::new(storage.clone()), "solana", 10)
    .with_clock(clock.clone())
    .with_clipboard(Box::new(copied.clone()))
    .with_browser(Box::new(opened.clone()));
  Harness { server, storage, clock, copied, opened, app }
}

fn key(app: &mut App, code: KeyCode) -> bool {
  app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
}

fn ctrl(app: &mut App, c: char) -> bool {
  app
    .handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    .unwrap()
}

fn type_text(app: &mut App, text: &str) {
  for c in text.chars() {
    key(app, KeyCode::Char(c));
  }
}

/// Run queued actions until none remain.
async fn settle(app: &mut App) {
  while app.pending().is_some() {
    app.run_pending().await;
  }
}

fn render(app: &App) -> String {
  let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
  terminal.draw(|f| ui::draw(f, app)).unwrap();
  let buffer = terminal.backend().buffer();
  let width = buffer.area.width as usize;
  buffer
    .content()
    .chunks(width)
    .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
    .collect::<Vec<_>>()
    .join("\n")
}

fn record(n: u8, input: &str, sql: &str) -> Value {
  json!({
    "id": format!("00000000-0000-4000-8000-0000000000{n:02x}"),
    "user_input": input,
    "sql_output": sql,
    "created_at": "2024-05-01T12:00:00Z",
    "error_message": null,
    "chain": "solana"
  })
}

fn with_guest_session(h: &Harness, id: &str) {
  h.storage.set(SESSION_KEY, id).unwrap();
  h.storage.set(USER_MODE_KEY, "guest").unwrap();
}

// ─── Landing ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn landing_animation_follows_the_clock() {
  let mut h = harness().await;
  assert_eq!(h.app.route, Route::Landing);

  h.clock.advance(Duration::from_millis(50));
  h.app.tick();
  assert_eq!(h.app.animation.displayed_input(), "S");

  // 26 characters typed, then the pause before generating.
  h.clock.advance(Duration::from_millis(25 * 50 + 500));
  h.app.tick();
  assert_eq!(h.app.animation.phase(), Phase::Generating);
  assert!(render(&h.app).contains("Generating DuneSQL..."));

  // Off the landing screen the animation is frozen.
  key(&mut h.app, KeyCode::Char('l'));
  assert_eq!(h.app.route, Route::Login);
  h.clock.advance(Duration::from_secs(1));
  h.app.tick();
  assert_eq!(h.app.animation.phase(), Phase::Generating);
}

#[tokio::test]
async fn landing_quits_on_q() {
  let mut h = harness().await;
  assert!(!key(&mut h.app, KeyCode::Char('q')));
}

#[tokio::test]
async fn try_demo_creates_guest_session_and_loads_history() {
  let mut h = harness().await;

  let history = h
    .server
    .mock("GET", "/api/v1/history")
    .match_query(Matcher::UrlEncoded("limit".into(), "10".into()))
    .with_status(200)
    .with_body("[]")
    .create_async()
    .await;

  // Cursor to "Try demo" and select it.
  key(&mut h.app, KeyCode::Right);
  key(&mut h.app, KeyCode::Right);
  key(&mut h.app, KeyCode::Enter);

  assert_eq!(h.app.route, Route::Dashboard);
  assert_eq!(h.app.pending(), Some(Action::LoadHistory));
  let id = h.storage.get(SESSION_KEY).unwrap().expect("session created");
  assert!(is_canonical_session_id(&id));
  assert_eq!(h.storage.get(USER_MODE_KEY).unwrap().as_deref(), Some("guest"));

  settle(&mut h.app).await;
  history.assert_async().await;
  assert_eq!(h.app.user_label(), "Guest");
  assert!(render(&h.app).contains("No queries yet"));
}

// ─── Generation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn generation_shows_sql_and_refreshes_history() {
  let mut h = harness().await;
  with_guest_session(&h, "sess-1");

  let history = h
    .server
    .mock("GET", "/api/v1/history")
    .match_query(Matcher::AllOf(vec![
      Matcher::UrlEncoded("session_id".into(), "sess-1".into()),
      Matcher::UrlEncoded("limit".into(), "10".into()),
    ]))
    .with_status(200)
    .with_body("[]")
    .expect(2)
    .create_async()
    .await;
  let generate = h
    .server
    .mock("POST", "/api/v1/generate")
    .match_body(Matcher::Json(json!({
      "user_input": "Show me top holders",
      "chain": "solana",
      "session_id": "sess-1"
    })))
    .with_status(200)
    .with_body(record(1, "Show me top holders", "SELECT * FROM solana.holders LIMIT 10").to_string())
    .create_async()
    .await;

  key(&mut h.app, KeyCode::Char('d'));
  settle(&mut h.app).await;
  assert!(!h.app.has_result());

  type_text(&mut h.app, "Show me top holders");
  key(&mut h.app, KeyCode::Enter);
  assert!(h.app.mutation.is_pending());
  assert!(h.app.has_result());
  assert!(render(&h.app).contains("Generating SQL…"));

  settle(&mut h.app).await;
  assert_eq!(h.app.generated_sql, "SELECT * FROM solana.holders LIMIT 10");
  assert!(render(&h.app).contains("SELECT * FROM solana.holders LIMIT 10"));

  generate.assert_async().await;
  history.assert_async().await;
}

#[tokio::test]
async fn empty_input_does_not_generate() {
  let mut h = harness().await;
  h.app.navigate(Route::Dashboard);
  settle(&mut h.app).await;

  type_text(&mut h.app, "   ");
  key(&mut h.app, KeyCode::Enter);
  assert_eq!(h.app.pending(), None);
  assert!(!h.app.mutation.is_pending());
}

#[tokio::test]
async fn server_reported_failure_is_shown_inline() {
  let mut h = harness().await;
  with_guest_session(&h, "sess-1");

  let mut failed = record(2, "gibberish", "");
  failed["sql_output"] = Value::Null;
  failed["error_message"] = json!("Could not understand the question");

  h.server
    .mock("GET", "/api/v1/history")
    .with_status(200)
    .with_body("[]")
    .create_async()
    .await;
  h.server
    .mock("POST", "/api/v1/generate")
    .with_status(200)
    .with_body(failed.to_string())
    .create_async()
    .await;

  h.app.navigate(Route::Dashboard);
  type_text(&mut h.app, "gibberish");
  ctrl(&mut h.app, 's');
  settle(&mut h.app).await;

  assert!(h.app.mutation.is_error());
  assert!(h.app.generated_sql.is_empty());
  assert!(render(&h.app).contains("Could not understand the question"));
}

#[tokio::test]
async fn example_chip_fills_the_input() {
  let mut h = harness().await;
  h.app.navigate(Route::Dashboard);

  key(&mut h.app, KeyCode::F(1));
  assert_eq!(h.app.input, "Top 10 SOL holders");
  key(&mut h.app, KeyCode::F(4));
  assert_eq!(h.app.input, "Token transfers");
}

#[tokio::test]
async fn placeholder_rotates_every_four_seconds() {
  let mut h = harness().await;
  h.app.navigate(Route::Dashboard);

  assert_eq!(h.app.placeholder(), PLACEHOLDER_EXAMPLES[0]);
  h.clock.advance(Duration::from_secs(4));
  assert_eq!(h.app.placeholder(), PLACEHOLDER_EXAMPLES[1]);
  assert!(render(&h.app).contains(PLACEHOLDER_EXAMPLES[1]));
}

// ─── History sidebar ──────────────────────────────────────────────────────────

#[tokio::test]
async fn history_renders_two_truncated_entries() {
  let mut h = harness().await;
  with_guest_session(&h, "sess-1");

  h.server
    .mock("GET", "/api/v1/history")
    .with_status(200)
    .with_body(
      json!([
        record(2, "Show me the daily trading volume of every DEX", "SELECT 2"),
        record(1, "Top 10 SOL holders", "SELECT 1"),
      ])
      .to_string(),
    )
    .create_async()
    .await;

  h.app.navigate(Route::Dashboard);
  settle(&mut h.app).await;

  assert_eq!(h.app.visible_history().len(), 2);
  let screen = render(&h.app);
  assert_eq!(screen.matches('▪').count(), 2);
  assert!(screen.contains("Show me the daily trading vo..."));
  assert!(!screen.contains("Show me the daily trading vol"));
  assert!(screen.contains("Top 10 SOL holders"));
  assert!(screen.contains("Query History (2)"));
}

#[tokio::test]
async fn selecting_history_loads_input_and_sql() {
  let mut h = harness().await;
  with_guest_session(&h, "sess-1");

  h.server
    .mock("GET", "/api/v1/history")
    .with_status(200)
    .with_body(
      json!([
        record(2, "Daily DEX volume", "SELECT 2"),
        record(1, "Top 10 SOL holders", "SELECT 1"),
      ])
      .to_string(),
    )
    .create_async()
    .await;

  h.app.navigate(Route::Dashboard);
  settle(&mut h.app).await;

  key(&mut h.app, KeyCode::Esc);
  assert_eq!(h.app.focus, Focus::History);
  key(&mut h.app, KeyCode::Char('j'));
  key(&mut h.app, KeyCode::Enter);
  assert_eq!(h.app.input, "Top 10 SOL holders");
  assert_eq!(h.app.generated_sql, "SELECT 1");
  assert!(h.app.has_result());

  ctrl(&mut h.app, 'n');
  assert!(h.app.input.is_empty());
  assert!(h.app.generated_sql.is_empty());
  assert_eq!(h.app.focus, Focus::Input);
}

#[tokio::test]
async fn history_filter_narrows_entries() {
  let mut h = harness().await;
  with_guest_session(&h, "sess-1");

  h.server
    .mock("GET", "/api/v1/history")
    .with_status(200)
    .with_body(
      json!([
        record(2, "Daily DEX volume", "SELECT 2"),
        record(1, "Top 10 SOL holders", "SELECT 1"),
      ])
      .to_string(),
    )
    .create_async()
    .await;

  h.app.navigate(Route::Dashboard);
  settle(&mut h.app).await;

  key(&mut h.app, KeyCode::Esc);
  key(&mut h.app, KeyCode::Char('/'));
  type_text(&mut h.app, "dex");
  assert_eq!(h.app.visible_history().len(), 1);

  // A single match is opened directly.
  key(&mut h.app, KeyCode::Enter);
  assert_eq!(h.app.generated_sql, "SELECT 2");
}

#[tokio::test]
async fn history_is_not_requested_without_session() {
  let mut h = harness().await;
  let mock = h
    .server
    .mock("GET", "/api/v1/history")
    .expect(0)
    .create_async()
    .await;

  h.app.navigate(Route::Dashboard);
  settle(&mut h.app).await;
  assert!(h.app.history_records().is_empty());
  mock.assert_async().await;
}

// ─── Viewer actions ───────────────────────────────────────────────────────────

#[tokio::test]
async fn copy_and_open_in_dune() {
  let mut h = harness().await;
  h.app.navigate(Route::Dashboard);
  h.app.generated_sql = "SELECT 1".into();

  ctrl(&mut h.app, 'y');
  assert_eq!(h.copied.items(), vec!["SELECT 1".to_string()]);
  assert_eq!(h.app.toast().map(|t| t.message.as_str()), Some("Copied to clipboard"));

  ctrl(&mut h.app, 'e');
  assert_eq!(h.opened.items(), vec![dune_url("SELECT 1")]);

  h.clock.advance(Duration::from_secs(3));
  h.app.tick();
  assert!(h.app.toast().is_none());
}

#[tokio::test]
async fn clipboard_failure_becomes_a_notification() {
  let h = harness().await;
  let mut app = h.app.with_clipboard(Box::new(BrokenClipboard));
  app.navigate(Route::Dashboard);
  app.generated_sql = "SELECT 1".into();

  ctrl(&mut app, 'y');
  assert_eq!(app.toast().map(|t| t.message.as_str()), Some("Failed to copy"));
  assert!(render(&app).contains("Failed to copy"));
}

#[tokio::test]
async fn debugger_is_a_placeholder() {
  let mut h = harness().await;
  h.app.navigate(Route::Dashboard);

  ctrl(&mut h.app, 'd');
  assert_eq!(h.app.route, Route::Debug);
  assert!(render(&h.app).contains("Coming in version 2.0."));

  key(&mut h.app, KeyCode::Esc);
  assert_eq!(h.app.route, Route::Dashboard);
}

#[tokio::test]
async fn new_query_leaves_the_debugger() {
  let mut h = harness().await;
  h.app.navigate(Route::Dashboard);
  ctrl(&mut h.app, 'd');
  h.app.input = "draft".into();
  h.app.generated_sql = "SELECT 1".into();

  ctrl(&mut h.app, 'n');
  assert_eq!(h.app.route, Route::Dashboard);
  assert!(h.app.input.is_empty());
  assert!(h.app.generated_sql.is_empty());
  assert!(!render(&h.app).contains("Coming in version 2.0."));
}

#[tokio::test]
async fn oversized_toast_is_clipped_to_the_screen() {
  let mut h = harness().await;
  h.app.navigate(Route::Dashboard);
  h.app.notify("x".repeat(70_000));
  assert!(render(&h.app).contains("xxxx"));
}

// ─── Authentication ───────────────────────────────────────────────────────────

#[tokio::test]
async fn login_then_logout() {
  let mut h = harness().await;

  let login = h
    .server
    .mock("POST", "/api/v1/auth/login")
    .match_body(Matcher::AllOf(vec![
      Matcher::UrlEncoded("username".into(), "alice@example.com".into()),
      Matcher::UrlEncoded("password".into(), "hunter2".into()),
    ]))
    .with_status(200)
    .with_body(r#"{"access_token":"test-jwt-token","token_type":"bearer"}"#)
    .create_async()
    .await;

  key(&mut h.app, KeyCode::Char('l'));
  type_text(&mut h.app, "alice@example.com");
  key(&mut h.app, KeyCode::Tab);
  type_text(&mut h.app, "hunter2");
  assert!(render(&h.app).contains("•••••••"));

  key(&mut h.app, KeyCode::Enter);
  assert_eq!(h.app.pending(), Some(Action::Login));
  settle(&mut h.app).await;
  login.assert_async().await;

  assert_eq!(h.app.route, Route::Dashboard);
  assert_eq!(h.app.user_label(), "alice@example.com");
  assert_eq!(
    TokenStore::new(h.storage.clone()).get().unwrap().as_deref(),
    Some("test-jwt-token")
  );

  type_text(&mut h.app, "half-typed question");
  ctrl(&mut h.app, 'o');

  assert_eq!(h.app.route, Route::Login);
  assert_eq!(TokenStore::new(h.storage.clone()).get().unwrap(), None);
  assert!(h.app.input.is_empty());
  assert_eq!(h.app.user_label(), "Not signed in");
}

#[tokio::test]
async fn guest_logout_clears_the_session() {
  let mut h = harness().await;
  let history = h
    .server
    .mock("GET", "/api/v1/history")
    .match_query(Matcher::Any)
    .with_status(200)
    .with_body("[]")
    .create_async()
    .await;

  key(&mut h.app, KeyCode::Char('d'));
  settle(&mut h.app).await;
  history.assert_async().await;
  assert!(h.storage.get(SESSION_KEY).unwrap().is_some());
  assert_eq!(h.app.user_label(), "Guest");

  ctrl(&mut h.app, 'o');

  assert_eq!(h.app.route, Route::Login);
  assert_eq!(h.storage.get(SESSION_KEY).unwrap(), None);
  assert_eq!(h.storage.get(USER_MODE_KEY).unwrap(), None);
  assert_eq!(h.app.user_label(), "Not signed in");
}

#[tokio::test]
async fn login_failure_stays_on_the_form() {
  let mut h = harness().await;

  h.server
    .mock("POST", "/api/v1/auth/login")
    .with_status(401)
    .with_body(r#"{"detail":"Incorrect email or password"}"#)
    .create_async()
    .await;

  key(&mut h.app, KeyCode::Char('l'));
  type_text(&mut h.app, "wrong@example.com");
  key(&mut h.app, KeyCode::Tab);
  type_text(&mut h.app, "wrong");
  key(&mut h.app, KeyCode::Enter);
  settle(&mut h.app).await;

  assert_eq!(h.app.route, Route::Login);
  assert!(!h.app.form.submitting);
  assert_eq!(h.app.form.error.as_deref(), Some("Incorrect email or password"));
  assert!(render(&h.app).contains("Incorrect email or password"));
}

#[tokio::test]
async fn incomplete_form_is_rejected_locally() {
  let mut h = harness().await;
  key(&mut h.app, KeyCode::Char('s'));
  assert_eq!(h.app.route, Route::Signup);

  key(&mut h.app, KeyCode::Enter);
  assert_eq!(h.app.pending(), None);
  assert_eq!(h.app.form.error.as_deref(), Some("Email and password are required"));
}

#[tokio::test]
async fn signup_sends_full_name() {
  let mut h = harness().await;

  let signup = h
    .server
    .mock("POST", "/api/v1/auth/signup")
    .match_body(Matcher::Json(json!({
      "email": "new@example.com",
      "password": "password123",
      "full_name": "New User"
    })))
    .with_status(200)
    .with_body(r#"{"access_token":"new-jwt-token","token_type":"bearer"}"#)
    .create_async()
    .await;

  key(&mut h.app, KeyCode::Char('s'));
  // Signup starts on the email field; full name is above it.
  key(&mut h.app, KeyCode::BackTab);
  type_text(&mut h.app, "New User");
  key(&mut h.app, KeyCode::Tab);
  type_text(&mut h.app, "new@example.com");
  key(&mut h.app, KeyCode::Tab);
  type_text(&mut h.app, "password123");
  key(&mut h.app, KeyCode::Enter);
  settle(&mut h.app).await;

  signup.assert_async().await;
  assert_eq!(h.app.route, Route::Dashboard);
}

// ─── Subcommands ──────────────────────────────────────────────────────────────

fn context(h: &Harness) -> Context {
  let client = ApiClient::new(
    ApiConfig::new(format!("{}/api/v1", h.server.url())),
    TokenStore::new(h.storage.clone()),
  )
  .unwrap();
  Context {
    client,
    session: SessionIdentity::new(h.storage.clone()),
    settings: Settings {
      api_url:       format!("{}/api/v1", h.server.url()),
      data_dir:      PathBuf::from("."),
      chain:         "solana".into(),
      history_limit: 10,
      timeout_secs:  5,
    },
  }
}

async fn run_command(ctx: &Context, command: Command) -> String {
  let mut out = Vec::new();
  commands::run(command, ctx, &mut out).await.unwrap();
  String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn guest_command_is_stable() {
  let h = harness().await;
  let ctx = context(&h);

  let first = run_command(&ctx, Command::Guest).await;
  let second = run_command(&ctx, Command::Guest).await;
  assert!(is_canonical_session_id(first.trim()));
  assert_eq!(first, second);
}

#[tokio::test]
async fn logout_command_ends_guest_mode() {
  let h = harness().await;
  let ctx = context(&h);

  let first = run_command(&ctx, Command::Guest).await;
  assert_eq!(run_command(&ctx, Command::Logout).await, "Logged out\n");
  assert_eq!(h.storage.get(SESSION_KEY).unwrap(), None);
  assert_eq!(h.storage.get(USER_MODE_KEY).unwrap(), None);

  let second = run_command(&ctx, Command::Guest).await;
  assert_ne!(first, second);
}

#[tokio::test]
async fn generate_command_prints_sql() {
  let mut h = harness().await;
  h.server
    .mock("POST", "/api/v1/generate")
    .match_body(Matcher::PartialJson(json!({ "user_input": "Token transfers" })))
    .with_status(200)
    .with_body(record(3, "Token transfers", "SELECT * FROM tokens.transfers").to_string())
    .create_async()
    .await;

  let ctx = context(&h);
  let out = run_command(&ctx, Command::Generate {
    question: "Token transfers".into(),
    chain:    None,
  })
  .await;
  assert_eq!(out, "SELECT * FROM tokens.transfers\n");
}

#[tokio::test]
async fn history_command_without_session() {
  let h = harness().await;
  let ctx = context(&h);
  let out = run_command(&ctx, Command::History { limit: None }).await;
  assert!(out.contains("chainquery guest"));
}

#[tokio::test]
async fn dune_command_prints_link() {
  let h = harness().await;
  let ctx = context(&h);
  let out = run_command(&ctx, Command::Dune { sql: "SELECT 1".into() }).await;
  assert_eq!(out.trim(), "https://dune.com/queries/new?query=SELECT%201");
}
