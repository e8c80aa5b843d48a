//! History sidebar, the left panel.

use chainquery_core::{
  query::QueryRecord,
  route::Route,
  viewer::{HISTORY_LABEL_MAX, truncate_label},
};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, Focus};

/// Sidebar text for one history entry.
pub fn entry_label(record: &QueryRecord) -> String {
  truncate_label(&record.user_input, HISTORY_LABEL_MAX)
}

/// Render the sidebar into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let focused = app.focus == Focus::History && !app.sidebar_collapsed;
  let border = if focused { Color::Cyan } else { Color::DarkGray };

  if app.sidebar_collapsed {
    draw_collapsed(f, area, border);
    return;
  }

  let filtered = app.visible_history();
  let total = app.history_records().len();

  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" Query History ({}/{}) ", filtered.len(), total)
  } else {
    format!(" Query History ({total}) ")
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(2), // new query
      Constraint::Min(0),    // history
      Constraint::Length(1), // filter
      Constraint::Length(1), // debugger link
    ])
    .split(inner);

  f.render_widget(
    Paragraph::new(Line::from(vec![
      Span::styled("+ New Query", Style::default().add_modifier(Modifier::BOLD)),
      Span::styled("  ^N", Style::default().fg(Color::DarkGray)),
    ])),
    rows[0],
  );

  draw_entries(f, rows[1], app, &filtered, focused);

  if app.filter_active || !app.filter.is_empty() {
    let filter_text = if app.filter_active {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      rows[2],
    );
  }

  let debugger_style = if app.route == Route::Debug {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::Gray)
  };
  f.render_widget(
    Paragraph::new(Line::from(vec![
      Span::styled("🐞 SQL Debugger", debugger_style),
      Span::styled("  ^D", Style::default().fg(Color::DarkGray)),
    ])),
    rows[3],
  );
}

fn draw_entries(f: &mut Frame, area: Rect, app: &App, filtered: &[&QueryRecord], focused: bool) {
  if filtered.is_empty() {
    let text = if app.pending().is_some() && app.history.current().is_none() {
      "Loading…"
    } else if app.filter.is_empty() {
      "No queries yet"
    } else {
      "No matches"
    };
    f.render_widget(
      Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
      area,
    );
    return;
  }

  let items: Vec<ListItem> = filtered
    .iter()
    .map(|record| {
      let icon_style = if record.is_failed() {
        Style::default().fg(Color::Red)
      } else {
        Style::default().fg(Color::DarkGray)
      };
      ListItem::new(Line::from(vec![
        Span::styled("▪ ", icon_style),
        Span::raw(entry_label(record)),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.history_cursor));

  let highlight = if focused {
    Style::default()
      .bg(Color::Blue)
      .fg(Color::White)
      .add_modifier(Modifier::BOLD)
  } else {
    Style::default().add_modifier(Modifier::BOLD)
  };

  f.render_stateful_widget(
    List::new(items)
      .highlight_style(highlight)
      .highlight_symbol(""),
    area,
    &mut state,
  );
}

fn draw_collapsed(f: &mut Frame, area: Rect, border: Color) {
  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new(vec![
      Line::from(" +"),
      Line::from(" ≡"),
      Line::from(" 🐞"),
    ])
    .style(Style::default().fg(Color::Gray)),
    inner,
  );
}
