//! Dashboard panes for the owner, teacher, and student.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use rollcall_core::{
  attendance::Status,
  render::{Region, RegionBody, RegionId},
  surface::{Profile, Tab},
};

use crate::view::{RegisterField, ViewState};

// ─── Owner ───────────────────────────────────────────────────────────────────

pub fn draw_owner(f: &mut Frame, area: Rect, view: &ViewState) {
  match view.tab {
    Some(Tab::Teachers) => draw_region(f, area, " Teachers ", view.region(RegionId::Teachers)),
    Some(Tab::Students) => draw_region(f, area, " Students ", view.region(RegionId::Students)),
    Some(Tab::Reports) => draw_stats(f, area, view),
    _ => draw_register_form(f, area, view),
  }
}

fn draw_register_form(f: &mut Frame, area: Rect, view: &ViewState) {
  let block = pane(" Register ");
  let inner = block.inner(area);
  f.render_widget(block, area);

  let form = &view.register;
  let field = |label: &str, value: String, which: RegisterField| {
    let focused = form.focus == which;
    let value_style = if focused {
      Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
      Style::default()
    };
    let cursor = if focused && which != RegisterField::Role { "_" } else { "" };
    Line::from(vec![
      Span::styled(format!(" {label:<10}"), Style::default().fg(Color::Cyan)),
      Span::styled(format!("{value}{cursor}"), value_style),
    ])
  };

  let submit_style = if form.focus == RegisterField::Submit {
    Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::Gray)
  };

  let lines = vec![
    Line::from(""),
    field("Role", format!("< {} >", form.role.title()), RegisterField::Role),
    field("Name", form.name.clone(), RegisterField::Name),
    field(form.detail_label(), form.detail().to_owned(), RegisterField::Detail),
    Line::from(""),
    Line::from(vec![Span::raw(" "), Span::styled(" Register ", submit_style)]),
  ];
  f.render_widget(Paragraph::new(lines), inner);
}

fn draw_stats(f: &mut Frame, area: Rect, view: &ViewState) {
  let block = pane(" Reports ");
  let inner = block.inner(area);
  f.render_widget(block, area);

  let Some(stats) = view.stats else {
    f.render_widget(dim("Loading…"), inner);
    return;
  };
  let row = |label: &str, n: usize| {
    Line::from(vec![
      Span::styled(format!(" {label:<16}"), Style::default().fg(Color::Cyan)),
      Span::styled(n.to_string(), Style::default().add_modifier(Modifier::BOLD)),
    ])
  };
  let lines = vec![
    Line::from(""),
    row("Teachers", stats.teachers),
    row("Students", stats.students),
    row("Present today", stats.present_today),
  ];
  f.render_widget(Paragraph::new(lines), inner);
}

// ─── Teacher ─────────────────────────────────────────────────────────────────

pub fn draw_teacher(f: &mut Frame, area: Rect, view: &ViewState) {
  match view.tab {
    Some(Tab::CheckIn) => draw_check_in(f, area),
    Some(Tab::StudentsAttendance) => {
      let title = match view.attendance_date {
        Some(date) => format!(" Students' attendance  ◀ {date} ▶ "),
        None => " Students' attendance ".to_owned(),
      };
      draw_region(f, area, &title, view.region(RegionId::DayAttendance));
    }
    _ => draw_profile(f, area, view.profile.as_ref()),
  }
}

// ─── Student ─────────────────────────────────────────────────────────────────

pub fn draw_student(f: &mut Frame, area: Rect, view: &ViewState) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
    .split(area);
  let left = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(4), Constraint::Min(0)])
    .split(cols[0]);

  draw_profile(f, left[0], view.profile.as_ref());
  draw_check_in(f, left[1]);
  draw_region(f, cols[1], " Recent attendance ", view.region(RegionId::StudentHistory));
}

// ─── Shared panes ────────────────────────────────────────────────────────────

fn draw_profile(f: &mut Frame, area: Rect, profile: Option<&Profile>) {
  let title = profile.map(|p| format!(" {} ", p.heading)).unwrap_or_else(|| " Profile ".into());
  let block = pane(&title);
  let inner = block.inner(area);
  f.render_widget(block, area);

  let lines: Vec<Line> = profile
    .map(|p| p.lines.iter().map(|l| Line::from(format!(" {l}"))).collect())
    .unwrap_or_default();
  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_check_in(f: &mut Frame, area: Rect) {
  let block = pane(" Check in ");
  let inner = block.inner(area);
  f.render_widget(block, area);

  let option = |key: &str, status: Status| {
    Line::from(vec![
      Span::styled(format!(" [{key}] "), Style::default().fg(Color::Yellow)),
      Span::styled(status.label(), status_style(status)),
    ])
  };
  let lines = vec![
    Line::from(""),
    option("p", Status::Present),
    option("l", Status::Leave),
    option("s", Status::Sick),
  ];
  f.render_widget(Paragraph::new(lines), inner);
}

/// Render a live region: a loading hint before the first snapshot, the
/// empty-state message, or one multi-line entry per item.
fn draw_region(f: &mut Frame, area: Rect, title: &str, region: Option<&Region>) {
  let block = pane(title);
  let inner = block.inner(area);
  f.render_widget(block, area);

  let items = match region.map(|r| &r.body) {
    None => {
      f.render_widget(dim("Loading…"), inner);
      return;
    }
    Some(RegionBody::Empty(message)) => {
      f.render_widget(dim(message), inner);
      return;
    }
    Some(RegionBody::Items(items)) => items,
  };

  let entries: Vec<ListItem> = items
    .iter()
    .map(|item| {
      let title_style = item
        .status
        .map(status_style)
        .unwrap_or_default()
        .add_modifier(Modifier::BOLD);
      let mut head = vec![Span::styled(format!(" {}", item.title), title_style)];
      if let Some(status) = item.status {
        head.push(Span::styled(format!("  {}", status.label()), status_style(status)));
      }
      if let Some(badge) = &item.badge {
        head.push(Span::styled(format!("  {badge}"), Style::default().fg(Color::Yellow)));
      }

      let mut lines = vec![Line::from(head)];
      lines.extend(item.details.iter().map(|d| {
        Line::from(Span::styled(format!("   {d}"), Style::default().fg(Color::Gray)))
      }));
      lines.push(Line::from(""));
      ListItem::new(lines)
    })
    .collect();

  f.render_widget(List::new(entries), inner);
}

fn status_style(status: Status) -> Style {
  let color = match status {
    Status::Present => Color::Green,
    Status::Leave => Color::Yellow,
    Status::Sick => Color::Red,
  };
  Style::default().fg(color)
}

fn pane(title: &str) -> Block<'_> {
  Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray))
}

fn dim(text: &str) -> Paragraph<'_> {
  Paragraph::new(format!(" {text}")).style(Style::default().fg(Color::DarkGray))
}
