//! Form wiring and profile panels.

use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::{role::MemberRole, session::Session, surface::Profile};

/// Which optional register-form fields are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterFields {
  pub class:   bool,
  pub subject: bool,
}

/// Class is a student field, subject a teacher field.
pub fn register_fields(role: MemberRole) -> RegisterFields {
  RegisterFields {
    class:   role == MemberRole::Student,
    subject: role == MemberRole::Teacher,
  }
}

/// The teacher's attendance date picker starts at today's UTC date.
pub fn default_attendance_date(now: DateTime<Utc>) -> NaiveDate { now.date_naive() }

pub fn teacher_profile(session: &Session) -> Profile {
  Profile {
    heading: "Teacher".to_owned(),
    lines:   vec![
      "Role: Record attendance and follow up on students".to_owned(),
      "Permissions: View attendance of all students".to_owned(),
      format!(
        "Last sign-in: {}",
        session.signed_in_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
      ),
    ],
  }
}

pub fn student_profile() -> Profile {
  Profile { heading: "Student".to_owned(), lines: Vec::new() }
}
