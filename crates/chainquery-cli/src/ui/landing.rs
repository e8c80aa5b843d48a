//! Landing screen with the animated terminal demo.

use chainquery_core::animation::Phase;
use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{App, LandingAction};

const FEATURES: [(&str, &str); 3] = [
  (
    "Schema Aware",
    "Understands Solana table structures and relationships for accurate query generation.",
  ),
  (
    "Solana Optimized",
    "Trained on thousands of Solana-specific queries for DEX, NFT, and DeFi analytics.",
  ),
  (
    "Instant Debugging",
    "Paste broken SQL and let our AI agent fix syntax errors and optimize performance.",
  ),
];

/// Render the landing screen into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // brand bar
      Constraint::Length(6), // hero
      Constraint::Length(1), // actions
      Constraint::Length(1),
      Constraint::Min(8),    // terminal
      Constraint::Length(6), // features
      Constraint::Length(1), // hints
    ])
    .split(area);

  f.render_widget(
    Paragraph::new(Line::from(vec![Span::styled(
      " ❯ ChainQuery AI",
      Style::default().add_modifier(Modifier::BOLD),
    )]))
    .style(Style::default().bg(Color::DarkGray)),
    rows[0],
  );

  draw_hero(f, rows[1]);
  draw_actions(f, rows[2], app);
  draw_terminal(f, rows[4], app);
  draw_features(f, rows[5]);

  f.render_widget(
    Paragraph::new("←→ choose  Enter select  l sign in  s sign up  d demo  q quit")
      .alignment(Alignment::Center)
      .style(Style::default().fg(Color::DarkGray)),
    rows[6],
  );
}

fn draw_hero(f: &mut Frame, area: Rect) {
  let lines = vec![
    Line::from(""),
    Line::from(Span::styled("Powered by AI", Style::default().fg(Color::Magenta))),
    Line::from(vec![
      Span::styled("Turn English into ", Style::default().add_modifier(Modifier::BOLD)),
      Span::styled(
        "Blockchain Data",
        Style::default()
          .fg(Color::Green)
          .add_modifier(Modifier::BOLD),
      ),
    ]),
    Line::from(""),
    Line::from(Span::styled(
      "Ask ChainQuery to write your Dune Analytics queries in seconds.",
      Style::default().fg(Color::Gray),
    )),
  ];
  f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn draw_actions(f: &mut Frame, area: Rect, app: &App) {
  let mut spans = Vec::new();
  for (i, action) in LandingAction::ALL.iter().enumerate() {
    if i > 0 {
      spans.push(Span::raw("   "));
    }
    let style = if i == app.landing_cursor {
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::Gray)
    };
    spans.push(Span::styled(format!(" {} ", action.label()), style));
  }
  f.render_widget(
    Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
    area,
  );
}

fn draw_terminal(f: &mut Frame, area: Rect, app: &App) {
  let area = super::centered(area, 80, area.height);
  let block = Block::default()
    .title(Line::from(vec![
      Span::styled(" ● ", Style::default().fg(Color::Red)),
      Span::styled("● ", Style::default().fg(Color::Yellow)),
      Span::styled("● ", Style::default().fg(Color::Green)),
      Span::styled("chainquery-ai ", Style::default().fg(Color::DarkGray)),
    ]))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let anim = &app.animation;
  let mut input_line = vec![
    Span::styled("❯ ", Style::default().fg(Color::Green)),
    Span::raw(anim.displayed_input().to_string()),
  ];
  if anim.phase() == Phase::Typing {
    input_line.push(Span::styled("▌", Style::default().fg(Color::Gray)));
  }

  let mut lines = vec![Line::from(input_line), Line::from("")];
  if anim.phase() == Phase::Generating {
    lines.push(Line::from(Span::styled(
      "⠋ Generating DuneSQL...",
      Style::default().fg(Color::DarkGray),
    )));
  }
  if anim.shows_output() {
    lines.push(Line::from(Span::styled(
      anim.displayed_output().to_string(),
      Style::default().fg(Color::Green),
    )));
  }

  f.render_widget(
    Paragraph::new(lines)
      .wrap(Wrap { trim: false })
      .block(block),
    area,
  );
}

fn draw_features(f: &mut Frame, area: Rect) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Ratio(1, 3); 3])
    .split(area);

  for ((title, description), col) in FEATURES.iter().zip(cols.iter()) {
    let block = Block::default()
      .title(format!(" {title} "))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray));
    f.render_widget(
      Paragraph::new(*description)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Gray))
        .block(block),
      *col,
    );
  }
}
