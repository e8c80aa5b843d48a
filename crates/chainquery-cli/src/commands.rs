//! One-shot subcommands that run without the TUI.

use std::io::{self, BufRead, Write};

use anyhow::Context as _;
use chainquery_client::{
  ApiClient,
  hooks::{GenerateMutation, HistoryQuery},
};
use chainquery_core::{route::Navigation, session::SessionIdentity, viewer::dune_url};
use chrono::Local;
use clap::Subcommand;

use crate::settings::Settings;

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Start (or resume) a guest session and print its identifier.
  Guest,

  /// Sign in and persist the access token.
  Login {
    #[arg(long)]
    email: String,

    /// Read from stdin when not given.
    #[arg(long, env = "CHAINQUERY_PASSWORD", hide_env_values = true)]
    password: Option<String>,
  },

  /// Create an account and persist the access token.
  Signup {
    #[arg(long)]
    email: String,

    #[arg(long)]
    full_name: Option<String>,

    /// Read from stdin when not given.
    #[arg(long, env = "CHAINQUERY_PASSWORD", hide_env_values = true)]
    password: Option<String>,
  },

  /// Forget the access token.
  Logout,

  /// Generate SQL for a question and print it.
  Generate {
    question: String,

    /// Chain to query (defaults to the configured chain).
    #[arg(long)]
    chain: Option<String>,
  },

  /// Print recent queries for the current session.
  History {
    #[arg(long)]
    limit: Option<usize>,
  },

  /// Print the Dune link that opens `sql` in a new query.
  Dune { sql: String },
}

/// Everything a subcommand needs.
pub struct Context {
  pub client:   ApiClient,
  pub session:  SessionIdentity,
  pub settings: Settings,
}

pub async fn run(command: Command, ctx: &Context, out: &mut impl Write) -> anyhow::Result<()> {
  match command {
    Command::Guest => {
      let mut nav = Vec::<Navigation>::new();
      let id = ctx.session.handle_guest_access(&mut nav)?;
      writeln!(out, "{id}")?;
    }

    Command::Login { email, password } => {
      let password = password_or_prompt(password)?;
      ctx.client.login(&email, &password).await?;
      writeln!(out, "Logged in as {email}")?;
    }

    Command::Signup { email, full_name, password } => {
      let password = password_or_prompt(password)?;
      ctx
        .client
        .signup(&email, &password, full_name.as_deref())
        .await?;
      writeln!(out, "Account created for {email}")?;
    }

    Command::Logout => {
      if ctx.session.is_guest_user()? {
        ctx.session.clear_guest_session()?;
      }
      ctx.client.logout(&mut Vec::<Navigation>::new())?;
      writeln!(out, "Logged out")?;
    }

    Command::Generate { question, chain } => {
      let chain = chain.as_deref().unwrap_or(ctx.settings.chain.as_str());
      let mut history = HistoryQuery::new(ctx.settings.history_limit);
      let record = GenerateMutation::default()
        .run(&ctx.client, &ctx.session, &mut history, &question, chain)
        .await?;
      writeln!(out, "{}", record.sql())?;
    }

    Command::History { limit } => {
      let Some(session_id) = ctx.session.get_session_id()? else {
        writeln!(out, "No session yet. Run `chainquery guest` to start one.")?;
        return Ok(());
      };
      let limit = limit.unwrap_or(ctx.settings.history_limit);
      let records = ctx.client.get_history(&session_id, limit).await?;
      if records.is_empty() {
        writeln!(out, "No queries yet")?;
      }
      for record in records {
        let when = record.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
        writeln!(out, "{when}  {}", record.user_input)?;
        match &record.error_message {
          Some(err) => writeln!(out, "    error: {err}")?,
          None => {
            for line in record.sql().lines() {
              writeln!(out, "    {line}")?;
            }
          }
        }
      }
    }

    Command::Dune { sql } => writeln!(out, "{}", dune_url(&sql))?,
  }
  Ok(())
}

/// Read a password from stdin (echoed) when none was given.
fn password_or_prompt(password: Option<String>) -> anyhow::Result<String> {
  if let Some(password) = password {
    return Ok(password);
  }
  eprint!("Password: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  io::stdin()
    .lock()
    .read_line(&mut line)
    .context("reading password")?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
