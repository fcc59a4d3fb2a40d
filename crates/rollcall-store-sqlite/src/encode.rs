//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with fixed nanosecond precision
//! so that text ordering matches time ordering. Dates are `YYYY-MM-DD`.
//! Locations are compact JSON. Enums use their lowercase names.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rollcall_core::{
  attendance::{AttendanceRecord, Location, Photo, Status},
  role::MemberRole,
  store::Keyed,
  user::{Pin, UserRecord},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> / NaiveDate ───────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_role(role: MemberRole) -> &'static str {
  match role {
    MemberRole::Teacher => "teacher",
    MemberRole::Student => "student",
  }
}

pub fn decode_role(s: &str) -> Result<MemberRole> {
  s.parse()
    .map_err(|_| Error::Decode { column: "role", value: s.to_owned() })
}

pub fn encode_status(status: Status) -> &'static str {
  match status {
    Status::Present => "present",
    Status::Leave => "leave",
    Status::Sick => "sick",
  }
}

pub fn decode_status(s: &str) -> Result<Status> {
  s.parse()
    .map_err(|_| Error::Decode { column: "status", value: s.to_owned() })
}

// ─── Location ────────────────────────────────────────────────────────────────

pub fn encode_location(loc: &Location) -> Result<String> { Ok(serde_json::to_string(loc)?) }

pub fn decode_location(s: &str) -> Result<Location> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub key:           String,
  pub role:          String,
  pub name:          String,
  pub class:         Option<String>,
  pub subject:       Option<String>,
  pub registered_at: String,
  pub pin:           String,
}

impl RawUser {
  pub const COLUMNS: &'static str = "key, role, name, class, subject, registered_at, pin";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      key:           row.get(0)?,
      role:          row.get(1)?,
      name:          row.get(2)?,
      class:         row.get(3)?,
      subject:       row.get(4)?,
      registered_at: row.get(5)?,
      pin:           row.get(6)?,
    })
  }

  pub fn into_keyed(self) -> Result<Keyed<UserRecord>> {
    let pin = Pin::parse(&self.pin)
      .ok_or_else(|| Error::Decode { column: "pin", value: self.pin.clone() })?;
    Ok(Keyed {
      key:   self.key,
      value: UserRecord {
        name: self.name,
        role: decode_role(&self.role)?,
        class: self.class,
        subject: self.subject,
        registered_at: decode_dt(&self.registered_at)?,
        pin,
      },
    })
  }
}

/// Raw strings read directly from an `attendance` row.
pub struct RawAttendance {
  pub key:       String,
  pub role:      String,
  pub user_name: String,
  pub user_id:   String,
  pub status:    String,
  pub date:      String,
  pub time_in:   String,
  pub time_out:  String,
  pub location:  Option<String>,
  pub photo:     Option<String>,
  pub reason:    Option<String>,
  pub timestamp: String,
}

impl RawAttendance {
  pub const COLUMNS: &'static str = "key, role, user_name, user_id, status, date, time_in, \
                                     time_out, location, photo, reason, timestamp";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      key:       row.get(0)?,
      role:      row.get(1)?,
      user_name: row.get(2)?,
      user_id:   row.get(3)?,
      status:    row.get(4)?,
      date:      row.get(5)?,
      time_in:   row.get(6)?,
      time_out:  row.get(7)?,
      location:  row.get(8)?,
      photo:     row.get(9)?,
      reason:    row.get(10)?,
      timestamp: row.get(11)?,
    })
  }

  pub fn into_keyed(self) -> Result<Keyed<AttendanceRecord>> {
    let location = self.location.as_deref().map(decode_location).transpose()?;

    Ok(Keyed {
      key:   self.key,
      value: AttendanceRecord {
        role: decode_role(&self.role)?,
        user_name: self.user_name,
        user_id: decode_uuid(&self.user_id)?,
        status: decode_status(&self.status)?,
        date: decode_date(&self.date)?,
        time_in: self.time_in,
        time_out: self.time_out,
        location,
        photo: self.photo.map(Photo::from_data_url),
        reason: self.reason,
        timestamp: decode_dt(&self.timestamp)?,
      },
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_sort_as_text() {
    let a = Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap();
    let b = a + chrono::Duration::milliseconds(500);
    let c = a + chrono::Duration::seconds(1);
    let (ea, eb, ec) = (encode_dt(a), encode_dt(b), encode_dt(c));
    assert!(ea < eb && eb < ec);
    assert_eq!(decode_dt(&eb).unwrap(), b);
  }

  #[test]
  fn unknown_enum_values_are_rejected() {
    assert!(matches!(decode_status("late"), Err(Error::Decode { column: "status", .. })));
    assert!(matches!(decode_role("owner"), Err(Error::Decode { column: "role", .. })));
    assert_eq!(decode_status(encode_status(Status::Sick)).unwrap(), Status::Sick);
  }
}
