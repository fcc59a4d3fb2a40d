//! Directory service: registering and listing teachers and students.

use chrono::Utc;
use tracing::info;

use crate::{
  Error, Result,
  role::MemberRole,
  store::{Keyed, RollStore},
  subscription::Subscription,
  user::{Pin, Registration, UserRecord},
};

/// Validate the form, draw a PIN, and append the record to `users/{role}s`.
///
/// Validation failures return before the store is touched. PINs are not
/// checked for collisions.
pub async fn register<S: RollStore>(store: &S, form: Registration) -> Result<Keyed<UserRecord>> {
  let record = form.into_record(Pin::generate(), Utc::now())?;
  let entry = store.push_user(record).await.map_err(Error::store)?;
  info!(role = %entry.value.role, key = %entry.key, "registered user");
  Ok(entry)
}

/// Live list of `users/{role}s`, redelivered in full on every change.
pub async fn list_all<S: RollStore>(store: &S, role: MemberRole) -> Result<Subscription<UserRecord>> {
  store.subscribe_users(role).await.map_err(Error::store)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{ValidationError, testing::MemoryStore};

  #[tokio::test]
  async fn register_appends_with_pin() {
    let store = MemoryStore::new();
    let entry = register(&store, Registration::new(MemberRole::Student, "Sara").with_class("5A"))
      .await
      .unwrap();

    assert_eq!(entry.value.pin.as_str().len(), Pin::DIGITS);
    assert!(entry.value.pin.as_str().bytes().all(|b| b.is_ascii_digit()));
    assert_eq!(store.users(MemberRole::Student), vec![entry.value]);
  }

  #[tokio::test]
  async fn invalid_forms_never_reach_the_store() {
    let store = MemoryStore::new();

    let err = register(&store, Registration::new(MemberRole::Student, "Sara"))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::MissingClass)));

    let err = register(&store, Registration::new(MemberRole::Teacher, "Omar"))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::MissingSubject)));

    assert_eq!(store.writes(), 0);
    assert!(store.users(MemberRole::Student).is_empty());
    assert!(store.users(MemberRole::Teacher).is_empty());
  }

  #[tokio::test]
  async fn store_failure_surfaces_message() {
    let store = MemoryStore::new();
    store.fail_writes(true);
    let err = register(&store, Registration::new(MemberRole::Teacher, "Omar").with_subject("Math"))
      .await
      .unwrap_err();
    assert_eq!(err.to_string(), "permission denied");
  }

  #[tokio::test]
  async fn list_all_delivers_current_set() {
    let store = MemoryStore::new();
    register(&store, Registration::new(MemberRole::Teacher, "Omar").with_subject("Math"))
      .await
      .unwrap();

    let mut sub = list_all(&store, MemberRole::Teacher).await.unwrap();
    let snapshot = sub.next().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.entries()[0].value.name, "Omar");
  }
}
