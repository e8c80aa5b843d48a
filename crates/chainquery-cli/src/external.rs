//! Side effects that leave the process: the clipboard and the system browser.
//!
//! Both sit behind traits so the app can be driven in tests without touching
//! the terminal or spawning a browser.

use std::io::{self, Write};

use base64::{Engine as _, engine::general_purpose::STANDARD};

pub trait Clipboard {
  fn copy(&mut self, text: &str) -> io::Result<()>;
}

pub trait Browser {
  fn open(&mut self, url: &str) -> io::Result<()>;
}

/// Copies through the terminal with an OSC 52 escape sequence, which works
/// over SSH and inside multiplexers that forward it.
#[derive(Debug, Default)]
pub struct Osc52Clipboard;

impl Clipboard for Osc52Clipboard {
  fn copy(&mut self, text: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write!(out, "\x1b]52;c;{}\x07", STANDARD.encode(text))?;
    out.flush()
  }
}

/// Opens URLs with the platform's default handler.
#[derive(Debug, Default)]
pub struct SystemBrowser;

impl Browser for SystemBrowser {
  fn open(&mut self, url: &str) -> io::Result<()> {
    tracing::info!(%url, "opening browser");
    open::that(url)
  }
}
