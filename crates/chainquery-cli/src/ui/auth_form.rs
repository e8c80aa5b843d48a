//! Login and signup forms.

use chainquery_core::route::Route;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::{App, AuthField, AuthForm};

/// Render the form for the current route into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let signup = app.route == Route::Signup;
  let fields = AuthForm::fields(app.route);
  let form = &app.form;

  let (title, subtitle, switch) = if signup {
    (
      " Create an account ",
      "Start generating SQL for Solana analytics",
      "Already have an account? ^T sign in",
    )
  } else {
    (
      " Sign in ",
      "Welcome back to ChainQuery",
      "Don't have an account? ^T sign up",
    )
  };

  let mut lines = vec![
    Line::from(Span::styled(subtitle, Style::default().fg(Color::Gray))),
    Line::from(""),
  ];

  for field in fields {
    let focused = *field == form.field;
    let value = match field {
      AuthField::Password => "•".repeat(form.password.chars().count()),
      other => form.value(*other).to_string(),
    };
    let caret = if focused && !form.submitting { "_" } else { "" };
    let label_style = if focused {
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::DarkGray)
    };
    lines.push(Line::from(Span::styled(field.label(), label_style)));
    lines.push(Line::from(vec![
      Span::styled(if focused { "› " } else { "  " }, label_style),
      Span::raw(value),
      Span::raw(caret),
    ]));
    lines.push(Line::from(""));
  }

  if let Some(err) = &form.error {
    lines.push(Line::from(Span::styled(
      err.as_str(),
      Style::default().fg(Color::Red),
    )));
    lines.push(Line::from(""));
  }

  let action = match (signup, form.submitting) {
    (true, true) => "Creating account…",
    (true, false) => "Enter  Create account",
    (false, true) => "Signing in…",
    (false, false) => "Enter  Sign in",
  };
  lines.push(Line::from(Span::styled(
    action,
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  )));
  lines.push(Line::from(Span::styled(
    switch,
    Style::default().fg(Color::DarkGray),
  )));
  lines.push(Line::from(Span::styled(
    "Tab next field  Esc back",
    Style::default().fg(Color::DarkGray),
  )));

  let height = lines.len() as u16 + 2;
  let rect = super::centered(area, 56, height);
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  f.render_widget(
    Paragraph::new(lines)
      .wrap(Wrap { trim: false })
      .block(block),
    rect,
  );
}
