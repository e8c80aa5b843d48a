//! `chainquery`: natural-language SQL for Solana analytics, in the terminal.
//!
//! # Usage
//!
//! ```
//! chainquery                                   # interactive TUI
//! chainquery --api-url http://localhost:8000/api/v1
//! chainquery guest
//! chainquery generate "Top 10 SOL holders"
//! chainquery history --limit 5
//! ```

mod app;
mod commands;
mod external;
mod settings;
mod ui;

#[cfg(test)]
mod tests;

use std::{
  fs::OpenOptions,
  io,
  path::{Path, PathBuf},
  sync::{Arc, Mutex},
  time::Duration,
};

use anyhow::{Context as _, Result};
use app::App;
use chainquery_client::{ApiClient, ApiConfig};
use chainquery_core::{session::SessionIdentity, storage::SharedStorage, token::TokenStore};
use chainquery_store_sqlite::SqliteStorage;
use clap::Parser;
use commands::Command;
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::{Overrides, Settings};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "chainquery", version, about = "Natural-language SQL for Solana analytics")]
struct Args {
  /// Path to a TOML config file (api_url, data_dir, chain, history_limit,
  /// timeout_secs).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the API, including the `/api/v1` prefix.
  #[arg(long, env = "CHAINQUERY_API_URL")]
  api_url: Option<String>,

  /// Directory holding the local database and log file.
  #[arg(long, value_name = "DIR")]
  data_dir: Option<PathBuf>,

  /// Write logs here instead of `<data dir>/chainquery.log`.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let settings = Settings::load(args.config.as_deref(), Overrides {
    api_url:  args.api_url,
    data_dir: args.data_dir,
    chain:    None,
  })?;

  std::fs::create_dir_all(&settings.data_dir)
    .with_context(|| format!("creating data directory {}", settings.data_dir.display()))?;
  let log_path = args.log_file.unwrap_or_else(|| settings.log_path());
  init_tracing(&log_path)?;

  let db_path = settings.database_path();
  let storage: SharedStorage = Arc::new(
    SqliteStorage::open(&db_path)
      .with_context(|| format!("failed to open storage at {db_path:?}"))?,
  );
  let tokens = TokenStore::new(storage.clone());
  let session = SessionIdentity::new(storage);
  let client = ApiClient::new(
    ApiConfig {
      base_url: settings.api_url.clone(),
      timeout:  Duration::from_secs(settings.timeout_secs),
    },
    tokens,
  )
  .context("failed to build HTTP client")?;

  tracing::info!(api_url = %settings.api_url, "starting");

  if let Some(command) = args.command {
    let ctx = commands::Context { client, session, settings };
    return commands::run(command, &ctx, &mut io::stdout().lock()).await;
  }

  let mut app = App::new(client, session, settings.chain.clone(), settings.history_limit);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

/// Log to a file; the TUI owns the terminal.
fn init_tracing(path: &Path) -> Result<()> {
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening log file {}", path.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(Mutex::new(file))
    .with_ansi(false)
    .init();
  Ok(())
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    app.tick();
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Network work runs after the frame that shows it as pending.
    if app.pending().is_some() {
      app.run_pending().await;
      continue;
    }

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    match maybe_event {
      Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
        if !app.handle_key(key)? {
          break;
        }
      }
      // Resize and everything else: redraw on the next iteration.
      _ => {}
    }
  }

  Ok(())
}
