//! Aggregate counts for the reports tab.
//!
//! Counts are read once on request and are not kept live; they go stale until
//! the next refresh.

use chrono::NaiveDate;
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::{
  attendance::Status,
  role::MemberRole,
  store::{AttendanceQuery, RollStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Stats {
  pub teachers:      usize,
  pub students:      usize,
  /// Present check-ins dated `today`, across every attendance collection.
  pub present_today: usize,
}

/// One-shot read of every count.
pub async fn load<S: RollStore>(store: &S, today: NaiveDate) -> Result<Stats, S::Error> {
  let teachers = store.users_once(MemberRole::Teacher).await?.len();
  let students = store.users_once(MemberRole::Student).await?.len();

  let mut present_today = 0;
  for role in MemberRole::iter() {
    let snapshot = store.attendance_once(AttendanceQuery::on_date(role, today)).await?;
    present_today += snapshot.values().filter(|r| r.status == Status::Present).count();
  }

  Ok(Stats { teachers, students, present_today })
}
