//! Modal overlays: reason prompt, camera preview, and notification banners.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use rollcall_core::{attendance::ReasonPrompt, capture::LocationReport, notify::NoticeKind};

use crate::{ui::centered, view::BannerView};

const BANNER_WIDTH: u16 = 48;

pub fn draw_reason_prompt(f: &mut Frame, area: Rect, prompt: &ReasonPrompt, reason: &str) {
  let rect = centered(area, 60, 10);
  f.render_widget(Clear, rect);

  let title = format!(" {} ", prompt.title);
  let block = modal(&title);
  let inner = block.inner(rect);
  f.render_widget(block, rect);

  let input = if reason.is_empty() {
    Span::styled(prompt.placeholder, Style::default().fg(Color::DarkGray))
  } else {
    Span::styled(format!("{reason}_"), Style::default().fg(Color::Yellow))
  };

  let lines = vec![
    Line::from(""),
    Line::from(Span::styled(
      format!(" {}", prompt.label),
      Style::default().fg(Color::Cyan),
    )),
    Line::from(vec![Span::raw(" > "), input]),
    Line::from(""),
    Line::from(Span::styled(
      format!(" {}", prompt.example),
      Style::default().fg(Color::Gray),
    )),
  ];
  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

pub fn draw_camera(f: &mut Frame, area: Rect, report: &LocationReport) {
  let rect = centered(area, 52, 10);
  f.render_widget(Clear, rect);

  let block = modal(" Camera ");
  let inner = block.inner(rect);
  f.render_widget(block, rect);

  let tint = match report {
    LocationReport::Fix(_) => Color::Green,
    LocationReport::Unavailable => Color::Yellow,
  };
  let mut lines = vec![Line::from("")];
  lines.extend(
    report
      .lines()
      .into_iter()
      .map(|l| Line::from(Span::styled(format!(" {l}"), Style::default().fg(tint)))),
  );
  lines.push(Line::from(""));
  lines.push(Line::from(vec![
    Span::styled(" [Enter] ", Style::default().fg(Color::Yellow)),
    Span::raw("capture photo   "),
    Span::styled("[Esc] ", Style::default().fg(Color::Yellow)),
    Span::raw("close"),
  ]));
  f.render_widget(Paragraph::new(lines), inner);
}

/// Banners stack downward from the top-right corner, newest last.
pub fn draw_banners(f: &mut Frame, area: Rect, banners: &[BannerView]) {
  let width = BANNER_WIDTH.min(area.width);
  let x = area.x + area.width - width;
  let mut y = area.y + 1;

  for view in banners {
    if y + 3 > area.y + area.height {
      break;
    }
    let color = match view.banner.kind {
      NoticeKind::Success => Color::Green,
      NoticeKind::Error => Color::Red,
    };
    let mut style = Style::default().fg(color);
    if view.leaving {
      style = style.add_modifier(Modifier::DIM);
    }

    let rect = Rect { x, y, width, height: 3 };
    f.render_widget(Clear, rect);
    f.render_widget(
      Paragraph::new(view.banner.message.as_str())
        .style(style)
        .block(Block::default().borders(Borders::ALL).border_style(style)),
      rect,
    );
    y += 3;
  }
}

fn modal(title: &str) -> Block<'_> {
  Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan))
}
