//! Layered client settings.
//!
//! Precedence, lowest first: built-in defaults, the TOML config file,
//! `CHAINQUERY_*` environment variables, command-line flags.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chainquery_client::DEFAULT_API_URL;
use chainquery_core::query::{DEFAULT_CHAIN, DEFAULT_HISTORY_LIMIT};
use serde::Deserialize;

const DEFAULT_TIMEOUT_SECS: i64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub api_url:       String,
  pub data_dir:      PathBuf,
  pub chain:         String,
  pub history_limit: usize,
  pub timeout_secs:  u64,
}

/// Values given on the command line; `None` leaves lower layers in charge.
#[derive(Debug, Default)]
pub struct Overrides {
  pub api_url:  Option<String>,
  pub data_dir: Option<PathBuf>,
  pub chain:    Option<String>,
}

impl Settings {
  /// Build the settings. A missing config file is not an error.
  ///
  /// Without `config_file`, `config.toml` in the default data directory is
  /// tried.
  pub fn load(config_file: Option<&Path>, overrides: Overrides) -> anyhow::Result<Self> {
    let default_dir = default_data_dir();
    let config_file = config_file
      .map(Path::to_path_buf)
      .unwrap_or_else(|| default_dir.join("config.toml"));

    let settings = config::Config::builder()
      .set_default("api_url", DEFAULT_API_URL)?
      .set_default("data_dir", default_dir.to_string_lossy().into_owned())?
      .set_default("chain", DEFAULT_CHAIN)?
      .set_default("history_limit", DEFAULT_HISTORY_LIMIT as i64)?
      .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?
      .add_source(config::File::from(config_file).required(false))
      .add_source(config::Environment::with_prefix("CHAINQUERY"))
      .set_override_option("api_url", overrides.api_url)?
      .set_override_option(
        "data_dir",
        overrides
          .data_dir
          .map(|p| p.to_string_lossy().into_owned()),
      )?
      .set_override_option("chain", overrides.chain)?
      .build()
      .context("failed to read configuration")?;

    let mut settings: Settings = settings
      .try_deserialize()
      .context("failed to deserialise Settings")?;
    settings.data_dir = expand_tilde(&settings.data_dir);
    Ok(settings)
  }

  pub fn database_path(&self) -> PathBuf { self.data_dir.join("chainquery.db") }

  pub fn log_path(&self) -> PathBuf { self.data_dir.join("chainquery.log") }
}

fn default_data_dir() -> PathBuf {
  dirs::data_dir()
    .map(|d| d.join("chainquery"))
    .unwrap_or_else(|| PathBuf::from("~/.local/share/chainquery"))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}
