//! Generator panel: query input, example chips, error alert and viewer.
//!
//! Until a result exists (or a generation is in flight) the panel shows a
//! centred hero layout; after that it splits into a compact input above the
//! viewer.

use chainquery_core::viewer::GENERATION_FAILED;
use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use super::sql_viewer;
use crate::app::{App, EXAMPLE_CHIPS, Focus};

const INPUT_HEIGHT: u16 = 6;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  if app.has_result() {
    draw_split(f, area, app);
  } else {
    draw_hero(f, area, app);
  }
}

fn draw_hero(f: &mut Frame, area: Rect, app: &App) {
  let alert = error_height(app);
  let content = super::centered(area, 90, 6 + INPUT_HEIGHT + alert + 2);
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(6),
      Constraint::Length(INPUT_HEIGHT),
      Constraint::Length(alert),
      Constraint::Length(2),
    ])
    .split(content);

  let intro = vec![
    Line::from(Span::styled(
      "AI-Powered SQL Generation",
      Style::default().fg(Color::Magenta),
    )),
    Line::from(""),
    Line::from(vec![
      Span::styled("Query Solana with ", Style::default().add_modifier(Modifier::BOLD)),
      Span::styled(
        "Natural Language",
        Style::default()
          .fg(Color::Green)
          .add_modifier(Modifier::BOLD),
      ),
    ]),
    Line::from(""),
    Line::from(Span::styled(
      "Describe what you want to analyze, and ChainQuery writes the DuneSQL.",
      Style::default().fg(Color::Gray),
    )),
  ];
  f.render_widget(Paragraph::new(intro).alignment(Alignment::Center), rows[0]);

  draw_input(f, rows[1], app);
  draw_error(f, rows[2], app);

  let mut chips = Vec::new();
  for (i, example) in EXAMPLE_CHIPS.iter().enumerate() {
    if i > 0 {
      chips.push(Span::raw("  "));
    }
    chips.push(Span::styled(format!("F{} ", i + 1), Style::default().fg(Color::DarkGray)));
    chips.push(Span::styled(format!("({example})"), Style::default().fg(Color::Gray)));
  }
  f.render_widget(
    Paragraph::new(vec![Line::from(""), Line::from(chips)]).alignment(Alignment::Center),
    rows[3],
  );
}

fn draw_split(f: &mut Frame, area: Rect, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(INPUT_HEIGHT),
      Constraint::Length(error_height(app)),
      Constraint::Min(0),
    ])
    .split(area);

  draw_input(f, rows[0], app);
  draw_error(f, rows[1], app);
  sql_viewer::draw(f, rows[2], app);
}

fn draw_input(f: &mut Frame, area: Rect, app: &App) {
  let focused = app.focus == Focus::Input;
  let block = Block::default()
    .title(" Ask a question ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Min(0), Constraint::Length(1)])
    .split(inner);

  let text = if app.input.is_empty() {
    Line::from(vec![
      Span::styled(if focused { "_" } else { "" }, Style::default()),
      Span::styled(app.placeholder(), Style::default().fg(Color::DarkGray)),
    ])
  } else {
    Line::from(vec![
      Span::raw(app.input.as_str()),
      Span::raw(if focused { "_" } else { "" }),
    ])
  };
  f.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), rows[0]);

  let footer = if app.mutation.is_pending() {
    Line::from(Span::styled("Generating…", Style::default().fg(Color::Yellow)))
  } else {
    Line::from(vec![
      Span::styled("Press ", Style::default().fg(Color::DarkGray)),
      Span::styled("Enter", Style::default().fg(Color::Gray)),
      Span::styled(" or ", Style::default().fg(Color::DarkGray)),
      Span::styled("^S", Style::default().fg(Color::Gray)),
      Span::styled(" to generate", Style::default().fg(Color::DarkGray)),
    ])
  };
  f.render_widget(Paragraph::new(footer).alignment(Alignment::Right), rows[1]);
}

fn error_height(app: &App) -> u16 { if app.mutation.is_error() { 3 } else { 0 } }

fn draw_error(f: &mut Frame, area: Rect, app: &App) {
  if !app.mutation.is_error() || area.height == 0 {
    return;
  }
  let message = app
    .mutation
    .error()
    .filter(|m| !m.is_empty())
    .unwrap_or(GENERATION_FAILED);
  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Red));
  f.render_widget(
    Paragraph::new(Line::from(vec![
      Span::styled("✗ ", Style::default().fg(Color::Red)),
      Span::raw(message),
    ]))
    .wrap(Wrap { trim: true })
    .block(block),
    area,
  );
}
