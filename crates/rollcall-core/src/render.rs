//! Live view rendering.
//!
//! Each function here is a pure mapping from a store snapshot to a complete
//! [`Region`]. The surface replaces the region wholesale on every push, so
//! rendering the same snapshot twice yields the same display.

use chrono::{Local, NaiveDate};

use crate::{
  attendance::{AttendanceRecord, Status},
  role::MemberRole,
  store::{AttendanceQuery, Snapshot},
  user::UserRecord,
};

/// Most records the student history view shows.
pub const HISTORY_LIMIT: usize = 5;

// ─── Regions ─────────────────────────────────────────────────────────────────

/// A named list region on the presentation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionId {
  Teachers,
  Students,
  DayAttendance,
  StudentHistory,
}

impl RegionId {
  pub fn directory(role: MemberRole) -> Self {
    match role {
      MemberRole::Teacher => Self::Teachers,
      MemberRole::Student => Self::Students,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
  pub id:   RegionId,
  pub body: RegionBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegionBody {
  /// The collection is empty; show this message instead of a list.
  Empty(&'static str),
  Items(Vec<Item>),
}

/// One rendered list entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
  pub title:   String,
  pub badge:   Option<String>,
  /// Attendance entries are tinted by status.
  pub status:  Option<Status>,
  pub details: Vec<String>,
}

impl Region {
  pub fn items(&self) -> &[Item] {
    match &self.body {
      RegionBody::Empty(_) => &[],
      RegionBody::Items(items) => items,
    }
  }
}

// ─── Directory ───────────────────────────────────────────────────────────────

pub fn directory(role: MemberRole, snapshot: &Snapshot<UserRecord>) -> Region {
  let id = RegionId::directory(role);
  if !snapshot.exists() {
    let empty = match role {
      MemberRole::Teacher => "No teachers registered yet",
      MemberRole::Student => "No students registered yet",
    };
    return Region { id, body: RegionBody::Empty(empty) };
  }

  let items = snapshot
    .values()
    .map(|user| {
      let mut details = Vec::new();
      if let Some(subject) = &user.subject {
        details.push(format!("Subject: {subject}"));
      }
      if let Some(class) = &user.class {
        details.push(format!("Class: {class}"));
      }
      details.push(format!(
        "Registered: {}",
        user.registered_at.with_timezone(&Local).format("%Y-%m-%d")
      ));
      Item {
        title: user.name.clone(),
        badge: Some(format!("PIN: {}", user.pin)),
        status: None,
        details,
      }
    })
    .collect();

  Region { id, body: RegionBody::Items(items) }
}

// ─── Attendance ──────────────────────────────────────────────────────────────

/// The two live attendance views: which query feeds them and how they render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceView {
  /// Students' check-ins on one day, for teachers.
  Day(NaiveDate),
  /// The latest student check-ins, newest first.
  History,
}

impl AttendanceView {
  pub fn region(self) -> RegionId {
    match self {
      Self::Day(_) => RegionId::DayAttendance,
      Self::History => RegionId::StudentHistory,
    }
  }

  pub fn query(self) -> AttendanceQuery {
    match self {
      Self::Day(date) => AttendanceQuery::on_date(MemberRole::Student, date),
      Self::History => AttendanceQuery::latest(MemberRole::Student, HISTORY_LIMIT),
    }
  }

  pub fn render(self, snapshot: &Snapshot<AttendanceRecord>) -> Region {
    match self {
      Self::Day(_) => day_attendance(snapshot),
      Self::History => history(snapshot),
    }
  }
}

pub fn day_attendance(snapshot: &Snapshot<AttendanceRecord>) -> Region {
  let id = RegionId::DayAttendance;
  if !snapshot.exists() {
    return Region { id, body: RegionBody::Empty("No attendance recorded for this day") };
  }

  let items = snapshot
    .values()
    .map(|rec| {
      let mut details = vec![format!("Time in: {}", rec.time_in)];
      if let Some(reason) = &rec.reason {
        details.push(format!("Reason: {reason}"));
      }
      if let Some(loc) = &rec.location {
        details.push(format!("Location: {:.4}, {:.4}", loc.latitude, loc.longitude));
      }
      if rec.photo.is_some() {
        details.push("Photo attached".to_owned());
      }
      Item {
        title: rec.user_name.clone(),
        badge: Some(rec.status.label().to_owned()),
        status: Some(rec.status),
        details,
      }
    })
    .collect();

  Region { id, body: RegionBody::Items(items) }
}

pub fn history(snapshot: &Snapshot<AttendanceRecord>) -> Region {
  let id = RegionId::StudentHistory;
  if !snapshot.exists() {
    return Region { id, body: RegionBody::Empty("No previous attendance records") };
  }

  let items = snapshot
    .values()
    .rev()
    .take(HISTORY_LIMIT)
    .map(|rec| {
      let mut details = vec![format!("Time: {}", rec.time_in)];
      if let Some(reason) = &rec.reason {
        details.push(format!("Reason: {reason}"));
      }
      Item {
        title: rec.date.format("%Y-%m-%d").to_string(),
        badge: Some(rec.status.label().to_owned()),
        status: Some(rec.status),
        details,
      }
    })
    .collect();

  Region { id, body: RegionBody::Items(items) }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone, Utc};

  use super::*;
  use crate::{
    attendance::Photo,
    store::Keyed,
    testing::{attendance, fix},
    user::{Pin, Registration},
  };

  fn snapshot<T>(values: Vec<T>) -> Snapshot<T> {
    Snapshot::new(
      values
        .into_iter()
        .enumerate()
        .map(|(i, value)| Keyed { key: format!("k{i}"), value })
        .collect(),
    )
  }

  #[test]
  fn empty_directory_shows_message() {
    let region = directory(MemberRole::Student, &Snapshot::empty());
    assert_eq!(region.id, RegionId::Students);
    assert_eq!(region.body, RegionBody::Empty("No students registered yet"));
  }

  #[test]
  fn directory_lists_in_insertion_order() {
    let now = Utc::now();
    let users = vec![
      Registration::new(MemberRole::Teacher, "Omar")
        .with_subject("Math")
        .into_record(Pin::parse("111222").unwrap(), now)
        .unwrap(),
      Registration::new(MemberRole::Teacher, "Huda")
        .with_subject("Science")
        .into_record(Pin::parse("333444").unwrap(), now)
        .unwrap(),
    ];
    let region = directory(MemberRole::Teacher, &snapshot(users));
    let items = region.items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "Omar");
    assert_eq!(items[0].badge.as_deref(), Some("PIN: 111222"));
    assert_eq!(items[0].details[0], "Subject: Math");
    assert!(items[0].details[1].starts_with("Registered: "));
    assert_eq!(items[1].title, "Huda");
  }

  #[test]
  fn rendering_is_idempotent() {
    let snap = snapshot(vec![attendance(MemberRole::Student, Utc::now())]);
    assert_eq!(day_attendance(&snap), day_attendance(&snap));
  }

  #[test]
  fn day_item_details() {
    let mut rec = attendance(MemberRole::Student, Utc::now());
    rec.status = Status::Sick;
    rec.reason = Some("fever".into());
    rec.location = Some(fix());
    rec.photo = Some(Photo::from_encoded(Photo::JPEG_MIME, b"jpeg"));

    let region = day_attendance(&snapshot(vec![rec.clone()]));
    let item = &region.items()[0];
    assert_eq!(item.status, Some(Status::Sick));
    assert_eq!(item.badge.as_deref(), Some("Sick"));
    assert_eq!(item.details, vec![
      format!("Time in: {}", rec.time_in),
      "Reason: fever".to_owned(),
      "Location: 30.0444, 31.2357".to_owned(),
      "Photo attached".to_owned(),
    ]);
  }

  #[test]
  fn history_is_latest_first_and_capped() {
    let base = Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap();
    let records: Vec<_> = (0..7)
      .map(|i| attendance(MemberRole::Student, base + Duration::days(i)))
      .collect();

    let region = history(&snapshot(records));
    let titles: Vec<_> = region.items().iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec![
      "2026-10-07",
      "2026-10-06",
      "2026-10-05",
      "2026-10-04",
      "2026-10-03",
    ]);
  }

  #[test]
  fn view_queries() {
    let day = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
    assert_eq!(
      AttendanceView::Day(day).query(),
      AttendanceQuery::on_date(MemberRole::Student, day)
    );
    assert_eq!(
      AttendanceView::History.query(),
      AttendanceQuery::latest(MemberRole::Student, HISTORY_LIMIT)
    );
  }
}
