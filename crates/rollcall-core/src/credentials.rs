//! The credential table: one shared PIN per role.
//!
//! PINs are compared in plaintext. There is no hashing, rate limiting, or
//! lockout, and failed attempts are not counted.

use crate::{Error, Result, ValidationError, role::Role, session::Session};

const OWNER_PIN: &str = "123456";
const TEACHER_PIN: &str = "111111";
const STUDENT_PIN: &str = "000000";

/// Static role → PIN lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialStore;

impl CredentialStore {
  pub fn pin_for(&self, role: Role) -> &'static str {
    match role {
      Role::Owner => OWNER_PIN,
      Role::Teacher => TEACHER_PIN,
      Role::Student => STUDENT_PIN,
    }
  }

  pub fn authenticate(&self, role: Role, pin: &str) -> bool { self.pin_for(role) == pin }

  /// Check a PIN typed into the login form and open a session on success.
  pub fn sign_in(&self, role: Role, pin: &str) -> Result<Session> {
    let pin = pin.trim();
    if pin.is_empty() {
      return Err(ValidationError::MissingPin.into());
    }
    if !self.authenticate(role, pin) {
      return Err(Error::InvalidPin);
    }
    Ok(Session::new(role))
  }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn every_role_accepts_only_its_pin() {
    let creds = CredentialStore;
    for role in Role::iter() {
      assert!(creds.authenticate(role, creds.pin_for(role)));
      assert!(!creds.authenticate(role, "999999"));
      assert!(!creds.authenticate(role, ""));
      for other in Role::iter().filter(|r| *r != role) {
        assert!(!creds.authenticate(role, creds.pin_for(other)));
      }
    }
  }

  #[test]
  fn sign_in_trims_input() {
    let session = CredentialStore.sign_in(Role::Owner, " 123456 ").unwrap();
    assert_eq!(session.role, Role::Owner);
  }

  #[test]
  fn sign_in_rejects_empty_and_wrong_pins() {
    assert!(matches!(
      CredentialStore.sign_in(Role::Teacher, "   "),
      Err(Error::Validation(ValidationError::MissingPin))
    ));
    assert!(matches!(
      CredentialStore.sign_in(Role::Teacher, "000000"),
      Err(Error::InvalidPin)
    ));
  }
}
