//! TUI rendering: lays out every pane and overlay.

pub mod dashboard;
pub mod login;
pub mod overlay;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph, Tabs},
};
use rollcall_core::{role::Role, surface::Tab};

use crate::view::ViewState;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

// ─── Root draw ───────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, view: &ViewState) {
  let area = f.area();

  // Vertical stack: header, tab bar, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Length(1), // tabs
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], view);
  draw_tabs(f, rows[1], view);
  match view.dashboard {
    None => login::draw(f, rows[2], view),
    Some(Role::Owner) => dashboard::draw_owner(f, rows[2], view),
    Some(Role::Teacher) => dashboard::draw_teacher(f, rows[2], view),
    Some(Role::Student) => dashboard::draw_student(f, rows[2], view),
  }
  draw_status(f, rows[3], view);

  // Overlays, topmost last.
  if let Some(prompt) = &view.reason_prompt {
    overlay::draw_reason_prompt(f, area, prompt, &view.reason);
  }
  if let Some(report) = &view.camera {
    overlay::draw_camera(f, area, report);
  }
  overlay::draw_banners(f, area, &view.banners);
}

// ─── Header ──────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, view: &ViewState) {
  let now = Local::now();
  let who = view.dashboard.map(Role::title).unwrap_or("Sign in");

  let left = Span::styled(
    format!(" rollcall  {who}"),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let spinner = if view.loading {
    let frame = (now.timestamp_subsec_millis() / 250) as usize % SPINNER.len();
    format!("{} loading  ", SPINNER[frame])
  } else {
    String::new()
  };
  let right = Span::styled(
    format!("{spinner}{} ", now.format("%Y-%m-%d %H:%M")),
    Style::default().fg(Color::Gray),
  );

  // Simple left-right header: pad the middle.
  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);
  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Tabs ────────────────────────────────────────────────────────────────────

fn draw_tabs(f: &mut Frame, area: Rect, view: &ViewState) {
  let tabs = view.dashboard.map(Tab::for_dashboard).unwrap_or_default();
  if tabs.is_empty() {
    return;
  }
  let selected = view.tab.and_then(|t| tabs.iter().position(|x| *x == t)).unwrap_or(0);
  let widget = Tabs::new(tabs.iter().map(|t| t.title()))
    .select(selected)
    .style(Style::default().fg(Color::DarkGray))
    .highlight_style(
      Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    );
  f.render_widget(widget, area);
}

// ─── Status bar ──────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, view: &ViewState) {
  let (mode_label, hints) = if view.reason_prompt.is_some() {
    ("REASON", "Type the reason  Enter continue  Esc close")
  } else if view.camera.is_some() {
    ("CAMERA", "Enter/c capture  Esc close")
  } else {
    match (view.dashboard, view.tab) {
      (None, _) => ("SIGN IN", "←→ role  0-9 PIN  Enter sign in  Esc quit"),
      (Some(Role::Owner), Some(Tab::Register)) => {
        ("OWNER", "Tab next tab  ↑↓ field  ←→ role  Enter register  ^L sign out")
      }
      (Some(Role::Owner), Some(Tab::Reports)) => ("OWNER", "Tab next tab  r refresh  ^L sign out"),
      (Some(Role::Owner), _) => ("OWNER", "Tab next tab  ^L sign out  ^Q quit"),
      (Some(Role::Teacher), Some(Tab::CheckIn)) => {
        ("TEACHER", "p present  l leave  s sick  Tab next tab  ^L sign out")
      }
      (Some(Role::Teacher), Some(Tab::StudentsAttendance)) => {
        ("TEACHER", "←→ day  t today  Tab next tab  ^L sign out")
      }
      (Some(Role::Teacher), _) => ("TEACHER", "Tab next tab  ^L sign out  ^Q quit"),
      (Some(Role::Student), _) => ("STUDENT", "p present  l leave  s sick  ^L sign out"),
    }
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {hints}"), Style::default().fg(Color::DarkGray));

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span])).style(Style::default().bg(Color::Black)),
    area,
  );
}

/// A rectangle of at most `width`×`height` centred in `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}
