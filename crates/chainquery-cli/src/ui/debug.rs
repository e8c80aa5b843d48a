//! Debugger screen. A placeholder until the debugging agent exists.

use ratatui::{
  Frame,
  layout::{Alignment, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn draw(f: &mut Frame, area: Rect) {
  let lines = vec![
    Line::from(""),
    Line::from(vec![
      Span::styled(
        "AI SQL Debugger",
        Style::default().add_modifier(Modifier::BOLD),
      ),
      Span::styled("  v2.0", Style::default().fg(Color::Magenta)),
    ]),
    Line::from(""),
    Line::from(Span::styled(
      "Paste your broken SQL and let our Agent analyze, explain, and fix it automatically.",
      Style::default().fg(Color::Gray),
    )),
    Line::from(Span::styled(
      "Coming in version 2.0.",
      Style::default().fg(Color::Gray),
    )),
    Line::from(""),
    Line::from(Span::styled(
      "[ Error Detection ]  [ Auto-Fix ]  [ Explanations ]",
      Style::default().fg(Color::DarkGray),
    )),
  ];

  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let rect = super::centered(area, 70, lines.len() as u16 + 2);
  f.render_widget(
    Paragraph::new(lines)
      .alignment(Alignment::Center)
      .wrap(Wrap { trim: true })
      .block(block),
    rect,
  );
}
