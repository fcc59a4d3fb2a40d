//! Error types for `rollcall-core`.
//!
//! The `Display` output of every variant is the text shown to the user; there
//! are no structured error codes.

use thiserror::Error;

use crate::{capture::CaptureError, role::Role};

/// A required form field was left empty. Raised before any store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("Please enter the full name")]
  MissingName,

  #[error("Please enter the class")]
  MissingClass,

  #[error("Please enter the subject")]
  MissingSubject,

  #[error("Please enter the reason")]
  MissingReason,

  #[error("Please enter your PIN")]
  MissingPin,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("Incorrect PIN")]
  InvalidPin,

  #[error("not signed in")]
  NotSignedIn,

  #[error("the {0} role does not record attendance")]
  NoAttendanceRole(Role),

  #[error("no check-in in progress")]
  NoPendingAttendance,

  #[error(transparent)]
  Capture(#[from] CaptureError),

  #[error("{0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a backend error coming out of a [`RollStore`](crate::store::RollStore).
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
