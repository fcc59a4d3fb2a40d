//! Directory records for registered teachers and students.

use std::fmt;

use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{role::MemberRole, ValidationError};

// ─── PIN ─────────────────────────────────────────────────────────────────────

/// A six-digit numeric PIN handed out at registration.
///
/// Drawn uniformly from `000000..=999999`. Uniqueness across the directory is
/// not checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pin(String);

impl Pin {
  pub const DIGITS: usize = 6;

  const SPACE: u32 = 1_000_000;

  /// Draw a PIN from the operating system's RNG.
  pub fn generate() -> Self { Self::generate_with(&mut OsRng) }

  pub fn generate_with<R: RngCore + ?Sized>(rng: &mut R) -> Self {
    // Reject the tail of the u32 range so every value is equally likely.
    let zone = u32::MAX - (u32::MAX % Self::SPACE);
    loop {
      let v = rng.next_u32();
      if v < zone {
        return Self(format!("{:06}", v % Self::SPACE));
      }
    }
  }

  /// Accept an existing PIN string, e.g. one read back from the store.
  pub fn parse(s: &str) -> Option<Self> {
    (s.len() == Self::DIGITS && s.bytes().all(|b| b.is_ascii_digit()))
      .then(|| Self(s.to_owned()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Pin {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A registered teacher or student. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
  pub name:          String,
  pub role:          MemberRole,
  /// Set for students only.
  pub class:         Option<String>,
  /// Set for teachers only.
  pub subject:       Option<String>,
  pub registered_at: DateTime<Utc>,
  pub pin:           Pin,
}

/// Raw values read from the register form.
#[derive(Debug, Clone)]
pub struct Registration {
  pub role:    MemberRole,
  pub name:    String,
  pub class:   String,
  pub subject: String,
}

impl Registration {
  pub fn new(role: MemberRole, name: impl Into<String>) -> Self {
    Self { role, name: name.into(), class: String::new(), subject: String::new() }
  }

  pub fn with_class(mut self, class: impl Into<String>) -> Self {
    self.class = class.into();
    self
  }

  pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
    self.subject = subject.into();
    self
  }

  /// Check the required fields for the role.
  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.name.trim().is_empty() {
      return Err(ValidationError::MissingName);
    }
    match self.role {
      MemberRole::Student if self.class.trim().is_empty() => {
        Err(ValidationError::MissingClass)
      }
      MemberRole::Teacher if self.subject.trim().is_empty() => {
        Err(ValidationError::MissingSubject)
      }
      _ => Ok(()),
    }
  }

  /// Validate and build the record to persist. The field that does not apply
  /// to the role is dropped.
  pub fn into_record(
    self,
    pin: Pin,
    registered_at: DateTime<Utc>,
  ) -> Result<UserRecord, ValidationError> {
    self.validate()?;
    let (class, subject) = match self.role {
      MemberRole::Student => (Some(self.class.trim().to_owned()), None),
      MemberRole::Teacher => (None, Some(self.subject.trim().to_owned())),
    };
    Ok(UserRecord {
      name: self.name.trim().to_owned(),
      role: self.role,
      class,
      subject,
      registered_at,
      pin,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Replays a fixed sequence of words.
  struct Seq(Vec<u32>);

  impl RngCore for Seq {
    fn next_u32(&mut self) -> u32 { self.0.remove(0) }
    fn next_u64(&mut self) -> u64 { self.next_u32() as u64 }
    fn fill_bytes(&mut self, dest: &mut [u8]) { dest.fill(0) }
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
      dest.fill(0);
      Ok(())
    }
  }

  #[test]
  fn pin_keeps_leading_zeros() {
    let pin = Pin::generate_with(&mut Seq(vec![42]));
    assert_eq!(pin.as_str(), "000042");
  }

  #[test]
  fn pin_rejects_biased_tail() {
    let pin = Pin::generate_with(&mut Seq(vec![u32::MAX, 1_234_567]));
    assert_eq!(pin.as_str(), "234567");
  }

  #[test]
  fn generated_pins_are_six_digits() {
    for _ in 0..100 {
      let pin = Pin::generate();
      assert!(Pin::parse(pin.as_str()).is_some(), "bad pin {pin}");
    }
  }

  #[test]
  fn parse_checks_shape() {
    assert!(Pin::parse("012345").is_some());
    assert!(Pin::parse("12345").is_none());
    assert!(Pin::parse("12a456").is_none());
  }

  #[test]
  fn student_requires_class() {
    let form = Registration::new(MemberRole::Student, "Sara").with_subject("Math");
    assert_eq!(form.validate(), Err(ValidationError::MissingClass));
  }

  #[test]
  fn teacher_requires_subject() {
    let form = Registration::new(MemberRole::Teacher, "Omar").with_class("5A");
    assert_eq!(form.validate(), Err(ValidationError::MissingSubject));
  }

  #[test]
  fn name_is_checked_first() {
    let form = Registration::new(MemberRole::Teacher, "  ");
    assert_eq!(form.validate(), Err(ValidationError::MissingName));
  }

  #[test]
  fn record_drops_field_for_other_role() {
    let record = Registration::new(MemberRole::Student, " Sara ")
      .with_class(" 5A ")
      .with_subject("ignored")
      .into_record(Pin::parse("123456").unwrap(), Utc::now())
      .unwrap();
    assert_eq!(record.name, "Sara");
    assert_eq!(record.class.as_deref(), Some("5A"));
    assert_eq!(record.subject, None);
  }
}
