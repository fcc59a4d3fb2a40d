//! Attendance records and the draft that precedes them.

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{role::MemberRole, ValidationError};

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
  Present,
  Leave,
  Sick,
}

impl Status {
  /// Leave and sick check-ins must carry a reason.
  pub fn requires_reason(self) -> bool { !matches!(self, Self::Present) }

  pub fn label(self) -> &'static str {
    match self {
      Self::Present => "Present",
      Self::Leave => "Leave",
      Self::Sick => "Sick",
    }
  }
}

// ─── Capture outputs ─────────────────────────────────────────────────────────

/// A device position fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
  pub latitude:  f64,
  pub longitude: f64,
  /// Radius of uncertainty in metres.
  pub accuracy:  f64,
  pub timestamp: DateTime<Utc>,
}

/// An encoded still image as a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Photo(String);

impl Photo {
  pub const JPEG_MIME: &'static str = "image/jpeg";

  pub fn from_encoded(mime: &str, bytes: &[u8]) -> Self {
    Self(format!("data:{mime};base64,{}", B64.encode(bytes)))
  }

  /// Wrap a payload read back from the store.
  pub fn from_data_url(url: String) -> Self { Self(url) }

  pub fn as_data_url(&self) -> &str { &self.0 }

  /// Decode the payload bytes, if the URL is a base64 `data:` URL.
  pub fn bytes(&self) -> Option<Vec<u8>> {
    let (_, b64) = self.0.strip_prefix("data:")?.split_once(";base64,")?;
    B64.decode(b64).ok()
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// One check-in. Written once, never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
  pub role:      MemberRole,
  pub user_name: String,
  pub user_id:   Uuid,
  pub status:    Status,
  /// UTC calendar day of the check-in.
  pub date:      NaiveDate,
  /// Local wall-clock time, `HH:MM:SS`.
  pub time_in:   String,
  /// Check-out is not implemented; always empty.
  pub time_out:  String,
  pub location:  Option<Location>,
  pub photo:     Option<Photo>,
  pub reason:    Option<String>,
  pub timestamp: DateTime<Utc>,
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// A check-in in progress. Cleared only once its record has been persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAttendance {
  pub role:   MemberRole,
  pub status: Status,
  pub reason: Option<String>,
}

impl PendingAttendance {
  pub fn new(role: MemberRole, status: Status) -> Self {
    Self { role, status, reason: None }
  }

  /// Attach the reason typed into the prompt; empty input is rejected.
  pub fn set_reason(&mut self, reason: &str) -> Result<(), ValidationError> {
    let reason = reason.trim();
    if reason.is_empty() {
      return Err(ValidationError::MissingReason);
    }
    self.reason = Some(reason.to_owned());
    Ok(())
  }

  /// The reason to persist, enforcing its presence for leave and sick.
  pub fn checked_reason(&self) -> Result<Option<&str>, ValidationError> {
    let reason = self.reason.as_deref().map(str::trim).filter(|r| !r.is_empty());
    if self.status.requires_reason() && reason.is_none() {
      return Err(ValidationError::MissingReason);
    }
    Ok(reason)
  }
}

/// Copy for the reason prompt shown before a leave or sick check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasonPrompt {
  pub status:      Status,
  pub title:       &'static str,
  pub label:       &'static str,
  pub placeholder: &'static str,
  pub example:     &'static str,
}

impl ReasonPrompt {
  pub fn for_status(status: Status) -> Option<Self> {
    match status {
      Status::Present => None,
      Status::Leave => Some(Self {
        status,
        title:       "Request leave",
        label:       "Reason for leave",
        placeholder: "Enter the reason for your leave request...",
        example:     "Example: family matter, doctor visit, etc.",
      }),
      Status::Sick => Some(Self {
        status,
        title:       "Report sickness",
        label:       "Illness",
        placeholder: "Enter the illness or symptoms...",
        example:     "Example: headache, fever, flu, etc.",
      }),
    }
  }
}
