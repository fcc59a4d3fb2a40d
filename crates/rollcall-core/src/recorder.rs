//! Attendance recorder: turns a session, a draft, and capture outputs into a
//! persisted attendance record.

use chrono::{DateTime, Local, Utc};
use tracing::info;

use crate::{
  Error, Result, ValidationError,
  attendance::{AttendanceRecord, PendingAttendance, ReasonPrompt, Status},
  capture::CaptureOutput,
  role::MemberRole,
  session::Session,
  store::{Keyed, RollStore},
};

/// What has to happen before capture can start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInStep {
  /// Go straight to the capture pipeline.
  Capture,
  /// Collect a reason first.
  Reason(ReasonPrompt),
}

/// Open a draft for `role` checking in with `status`.
pub fn start_check_in(role: MemberRole, status: Status) -> (PendingAttendance, CheckInStep) {
  let step = match ReasonPrompt::for_status(status) {
    Some(prompt) => CheckInStep::Reason(prompt),
    None => CheckInStep::Capture,
  };
  (PendingAttendance::new(role, status), step)
}

/// Build the record to persist. `time_out` is always left empty.
pub fn compose(
  session: &Session,
  pending: &PendingAttendance,
  capture: CaptureOutput,
  now: DateTime<Utc>,
) -> Result<AttendanceRecord, ValidationError> {
  let reason = pending.checked_reason()?.map(str::to_owned);
  Ok(AttendanceRecord {
    role: pending.role,
    user_name: session.display_name.clone(),
    user_id: session.session_id,
    status: pending.status,
    date: now.date_naive(),
    time_in: now.with_timezone(&Local).format("%H:%M:%S").to_string(),
    time_out: String::new(),
    location: capture.location,
    photo: capture.photo,
    reason,
    timestamp: now,
  })
}

/// Compose and append the record to `attendance/{role}s`.
///
/// A leave or sick draft without a reason is rejected before the store is
/// touched. The draft itself is left alone; the caller clears it on success.
pub async fn submit<S: RollStore>(
  store: &S,
  session: &Session,
  pending: &PendingAttendance,
  capture: CaptureOutput,
) -> Result<Keyed<AttendanceRecord>> {
  let record = compose(session, pending, capture, Utc::now())?;
  let entry = store.push_attendance(record).await.map_err(Error::store)?;
  info!(
    role = %entry.value.role,
    status = %entry.value.status,
    located = entry.value.location.is_some(),
    key = %entry.key,
    "attendance recorded"
  );
  Ok(entry)
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::{
    attendance::Photo,
    role::Role,
    testing::{MemoryStore, fix},
  };

  fn output() -> CaptureOutput {
    CaptureOutput {
      location: Some(fix()),
      photo:    Some(Photo::from_encoded(Photo::JPEG_MIME, b"jpeg")),
    }
  }

  #[test]
  fn present_goes_straight_to_capture() {
    let (draft, step) = start_check_in(MemberRole::Student, Status::Present);
    assert_eq!(step, CheckInStep::Capture);
    assert_eq!(draft.reason, None);
  }

  #[test]
  fn leave_and_sick_ask_for_reason() {
    for status in [Status::Leave, Status::Sick] {
      let (_, step) = start_check_in(MemberRole::Teacher, status);
      assert!(matches!(step, CheckInStep::Reason(p) if p.status == status));
    }
  }

  #[test]
  fn compose_fills_identity_and_blank_time_out() {
    let session = Session::new(Role::Teacher);
    let mut draft = PendingAttendance::new(MemberRole::Teacher, Status::Leave);
    draft.set_reason("doctor visit").unwrap();
    let now = Utc.with_ymd_and_hms(2026, 10, 16, 7, 45, 0).unwrap();

    let rec = compose(&session, &draft, output(), now).unwrap();
    assert_eq!(rec.role, MemberRole::Teacher);
    assert_eq!(rec.user_name, "teacher");
    assert_eq!(rec.user_id, session.session_id);
    assert_eq!(rec.date, now.date_naive());
    assert_eq!(rec.time_in.len(), 8);
    assert_eq!(rec.time_out, "");
    assert_eq!(rec.reason.as_deref(), Some("doctor visit"));
    assert_eq!(rec.location, Some(fix()));
    assert_eq!(rec.timestamp, now);
  }

  #[tokio::test]
  async fn missing_reason_never_reaches_store() {
    let store = MemoryStore::new();
    let session = Session::new(Role::Student);
    for status in [Status::Leave, Status::Sick] {
      let draft = PendingAttendance::new(MemberRole::Student, status);
      let err = submit(&store, &session, &draft, output()).await.unwrap_err();
      assert!(matches!(err, Error::Validation(ValidationError::MissingReason)));
    }
    assert_eq!(store.writes(), 0);
  }

  #[tokio::test]
  async fn submit_writes_to_role_collection() {
    let store = MemoryStore::new();
    let session = Session::new(Role::Student);
    let draft = PendingAttendance::new(MemberRole::Student, Status::Present);

    let entry = submit(&store, &session, &draft, output()).await.unwrap();
    assert_eq!(store.attendance(MemberRole::Student), vec![entry.value.clone()]);
    assert!(store.attendance(MemberRole::Teacher).is_empty());
    assert_eq!(entry.value.time_out, "");
  }
}
