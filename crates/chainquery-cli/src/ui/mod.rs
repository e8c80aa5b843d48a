//! TUI rendering. Dispatches on the current route.

pub mod auth_form;
pub mod debug;
pub mod generator;
pub mod landing;
pub mod sidebar;
pub mod sql_viewer;

use chainquery_core::route::Route;
use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::{App, Focus, Toast};

/// Sidebar width when expanded: a 28-character label plus icon, padding and
/// borders.
const SIDEBAR_WIDTH: u16 = 38;
const SIDEBAR_COLLAPSED_WIDTH: u16 = 5;

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  match app.route {
    Route::Landing => landing::draw(f, area, app),
    Route::Login | Route::Signup => auth_form::draw(f, area, app),
    Route::Dashboard | Route::Debug => draw_dashboard(f, area, app),
  }

  if let Some(toast) = app.toast() {
    draw_toast(f, area, toast);
  }
}

fn draw_dashboard(f: &mut Frame, area: Rect, app: &App) {
  // Vertical stack: navbar, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // navbar
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_navbar(f, rows[0], app);

  let sidebar_width = if app.sidebar_collapsed {
    SIDEBAR_COLLAPSED_WIDTH
  } else {
    SIDEBAR_WIDTH
  };
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Length(sidebar_width), Constraint::Min(0)])
    .split(rows[1]);

  sidebar::draw(f, cols[0], app);
  match app.route {
    Route::Debug => debug::draw(f, cols[1]),
    _ => generator::draw(f, cols[1], app),
  }

  draw_status(f, rows[2], app);
}

// ─── Navbar ───────────────────────────────────────────────────────────────────

fn draw_navbar(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%Y-%m-%d").to_string();
  let title = match app.route {
    Route::Debug => "SQL Debugger",
    _ => "SQL Generator",
  };

  let left = vec![
    Span::styled(
      format!(" {title} "),
      Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(
      format!(" {} ", chain_badge(&app.chain)),
      Style::default().fg(Color::Black).bg(Color::Magenta),
    ),
  ];
  let right = vec![
    Span::styled(app.user_label(), Style::default().fg(Color::Cyan)),
    Span::styled("  [^O] log out  ", Style::default().fg(Color::Gray)),
    Span::styled(format!("{date} "), Style::default().fg(Color::Gray)),
  ];

  // Simple left-right header: pad the middle.
  let width = |spans: &[Span]| spans.iter().map(Span::width).sum::<usize>() as u16;
  let pad = area
    .width
    .saturating_sub(width(&left))
    .saturating_sub(width(&right));

  let mut spans = left;
  spans.push(Span::raw(" ".repeat(pad as usize)));
  spans.extend(right);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

/// `solana` → `Solana`.
fn chain_badge(chain: &str) -> String {
  let mut chars = chain.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match (app.route, app.focus) {
    (Route::Debug, _) => ("DEBUG", "Esc back  ^D generator  q quit"),
    _ if app.filter_active => ("SEARCH", "Type to filter  Esc cancel  Enter select"),
    (_, Focus::Input) => (
      "INPUT",
      "Enter/^S generate  Tab focus  ^N new  ^B sidebar  ^D debugger  ^C quit",
    ),
    (_, Focus::History) => (
      "HISTORY",
      "↑↓/jk navigate  Enter open  / search  n new  Tab focus  q quit",
    ),
    (_, Focus::Viewer) => (
      "VIEWER",
      "↑↓/jk scroll  y copy  o open in Dune  Tab focus  q quit",
    ),
  };

  let status = match (&app.history_error, app.pending()) {
    (Some(err), _) => format!("History unavailable: {err}"),
    (None, Some(_)) => "Working…".to_string(),
    (None, None) => hints.to_string(),
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span])).style(Style::default().bg(Color::Black)),
    area,
  );
}

// ─── Toast ────────────────────────────────────────────────────────────────────

fn draw_toast(f: &mut Frame, area: Rect, toast: &Toast) {
  let width = u16::try_from(toast.message.chars().count())
    .unwrap_or(u16::MAX)
    .saturating_add(4)
    .min(area.width);
  let height = 3.min(area.height);
  let rect = Rect {
    x: area.x + area.width.saturating_sub(width + 1),
    y: area.y + area.height.saturating_sub(height + 1),
    width,
    height,
  };

  f.render_widget(Clear, rect);
  f.render_widget(
    Paragraph::new(toast.message.as_str())
      .wrap(Wrap { trim: true })
      .block(
        Block::default()
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::Yellow)),
      ),
    rect,
  );
}

/// Centre a `width` × `height` box inside `area`, clamped to fit.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}
