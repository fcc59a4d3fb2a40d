//! The signed-in session and the per-session mutable context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{attendance::PendingAttendance, role::Role, Error, Result};

/// Identity of whoever is signed in. Memory only; dropped on logout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
  pub role:         Role,
  /// Shared PINs carry no personal identity, so this is the role name.
  pub display_name: String,
  /// Fresh per sign-in; attendance records carry it as `user_id`.
  pub session_id:   Uuid,
  pub signed_in_at: DateTime<Utc>,
}

impl Session {
  pub fn new(role: Role) -> Self {
    Self {
      role,
      display_name: role.to_string(),
      session_id: Uuid::new_v4(),
      signed_in_at: Utc::now(),
    }
  }
}

/// Session-scoped state owned by the [`Controller`](crate::Controller).
///
/// The active camera stream lives in the controller's
/// [`CapturePipeline`](crate::capture::CapturePipeline); everything else that
/// was ambient page state lives here.
#[derive(Debug, Default)]
pub struct SessionContext {
  session: Option<Session>,
  pending: Option<PendingAttendance>,
}

impl SessionContext {
  pub fn session(&self) -> Option<&Session> { self.session.as_ref() }

  pub fn require_session(&self) -> Result<&Session> {
    self.session.as_ref().ok_or(Error::NotSignedIn)
  }

  pub fn sign_in(&mut self, session: Session) {
    self.pending = None;
    self.session = Some(session);
  }

  /// Drop both the identity and any draft.
  pub fn sign_out(&mut self) -> Option<Session> {
    self.pending = None;
    self.session.take()
  }

  pub fn pending(&self) -> Option<&PendingAttendance> { self.pending.as_ref() }

  pub fn pending_mut(&mut self) -> Option<&mut PendingAttendance> {
    self.pending.as_mut()
  }

  /// Start a new draft, replacing any previous one.
  pub fn begin(&mut self, pending: PendingAttendance) { self.pending = Some(pending); }

  /// Consume the draft once its record has been persisted.
  pub fn clear_pending(&mut self) -> Option<PendingAttendance> { self.pending.take() }
}
