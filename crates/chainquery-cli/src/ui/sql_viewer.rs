//! Read-only SQL viewer with line numbers, copy and "open in Dune".

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, Focus};

const KEYWORDS: &[&str] = &[
  "SELECT", "FROM", "WHERE", "GROUP", "ORDER", "BY", "LIMIT", "JOIN", "LEFT", "RIGHT", "INNER",
  "OUTER", "ON", "AS", "AND", "OR", "NOT", "IN", "IS", "NULL", "WITH", "HAVING", "DESC", "ASC",
  "DISTINCT", "UNION", "ALL", "CASE", "WHEN", "THEN", "ELSE", "END", "INTERVAL", "COUNT", "SUM",
  "AVG", "MIN", "MAX",
];

/// Render the viewer into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let focused = app.focus == Focus::Viewer;
  let actions = if app.generated_sql.is_empty() {
    String::new()
  } else {
    " y copy  o open in Dune ".to_string()
  };

  let block = Block::default()
    .title(" query.sql ")
    .title_bottom(Line::from(actions).right_aligned())
    .borders(Borders::ALL)
    .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }));
  let inner = block.inner(area);
  f.render_widget(block, area);

  if app.mutation.is_pending() {
    f.render_widget(
      Paragraph::new("Generating SQL…").style(Style::default().fg(Color::Yellow)),
      inner,
    );
    return;
  }

  if app.generated_sql.is_empty() {
    f.render_widget(
      Paragraph::new("Generated SQL will appear here.").style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let total = app.generated_sql.lines().count();
  let gutter = total.to_string().len();
  let lines: Vec<Line> = app
    .generated_sql
    .lines()
    .enumerate()
    .map(|(i, line)| {
      let mut spans = vec![Span::styled(
        format!("{:>gutter$} │ ", i + 1),
        Style::default().fg(Color::DarkGray),
      )];
      spans.extend(highlight(line));
      Line::from(spans)
    })
    .collect();

  f.render_widget(Paragraph::new(lines).scroll((app.viewer_scroll, 0)), inner);
}

/// Split `line` into spans, emphasising SQL keywords.
fn highlight(line: &str) -> Vec<Span<'_>> {
  line
    .split_inclusive(|c: char| c.is_whitespace() || c == ',' || c == '(' || c == ')')
    .map(|token| {
      let word = token.trim_end_matches(|c: char| c.is_whitespace() || c == ',' || c == '(' || c == ')');
      if KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word)) {
        Span::styled(
          token,
          Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        )
      } else {
        Span::raw(token)
      }
    })
    .collect()
}
