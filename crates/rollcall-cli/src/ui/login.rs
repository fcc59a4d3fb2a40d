//! Sign-in pane: role selector and PIN field.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};
use rollcall_core::{role::Role, user::Pin};
use strum::IntoEnumIterator;

use crate::{ui::centered, view::ViewState};

pub fn draw(f: &mut Frame, area: Rect, view: &ViewState) {
  let rect = centered(area, 44, 8);
  let block = Block::default()
    .title(" Sign in ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(rect);
  f.render_widget(block, rect);

  let mut roles = vec![Span::raw(" Role  ")];
  for role in Role::iter() {
    let style = if role == view.login_role {
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::Gray)
    };
    roles.push(Span::styled(format!(" {} ", role.title()), style));
    roles.push(Span::raw(" "));
  }

  // The PIN is masked; remaining digits show as underscores.
  let masked = format!(
    "{}{}",
    "•".repeat(view.pin.len()),
    "_".repeat(Pin::DIGITS.saturating_sub(view.pin.len()))
  );

  let lines = vec![
    Line::from(""),
    Line::from(roles),
    Line::from(""),
    Line::from(vec![
      Span::raw(" PIN   "),
      Span::styled(masked, Style::default().fg(Color::Yellow)),
    ]),
  ];
  f.render_widget(Paragraph::new(lines), inner);
}
