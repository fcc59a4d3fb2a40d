//! The `RollStore` trait and supporting query types.
//!
//! The trait models a hierarchical collection store: `users/{role}s` and
//! `attendance/{role}s`. Entries are appended under a store-generated key and
//! never updated. Implemented by `rollcall-store-sqlite`; the controller and
//! services depend only on this abstraction.

use std::{fmt, future::Future};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  attendance::AttendanceRecord,
  role::MemberRole,
  subscription::Subscription,
  user::UserRecord,
};

// ─── Collections ─────────────────────────────────────────────────────────────

/// A named collection in the store's hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
  Users(MemberRole),
  Attendance(MemberRole),
}

impl fmt::Display for Collection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Users(role) => write!(f, "users/{}", role.collection()),
      Self::Attendance(role) => write!(f, "attendance/{}", role.collection()),
    }
  }
}

// ─── Entries ─────────────────────────────────────────────────────────────────

/// A stored value together with the key the store generated for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyed<T> {
  pub key:   String,
  pub value: T,
}

/// The full, ordered content of a collection (or query) at one moment.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
  entries: Vec<Keyed<T>>,
}

impl<T> Snapshot<T> {
  pub fn new(entries: Vec<Keyed<T>>) -> Self { Self { entries } }

  pub fn empty() -> Self { Self { entries: Vec::new() } }

  /// Whether the collection has any entries at all.
  pub fn exists(&self) -> bool { !self.entries.is_empty() }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  pub fn entries(&self) -> &[Keyed<T>] { &self.entries }

  pub fn values(&self) -> impl DoubleEndedIterator<Item = &T> {
    self.entries.iter().map(|e| &e.value)
  }

  pub fn into_entries(self) -> Vec<Keyed<T>> { self.entries }
}

// ─── Attendance queries ──────────────────────────────────────────────────────

/// Which slice of an attendance collection to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceFilter {
  /// Every record, in insertion order.
  All,
  /// Records whose `date` equals the given day, in insertion order.
  OnDate(NaiveDate),
  /// The `n` records with the greatest `timestamp`, oldest first.
  Latest(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceQuery {
  pub role:   MemberRole,
  pub filter: AttendanceFilter,
}

impl AttendanceQuery {
  pub fn all(role: MemberRole) -> Self { Self { role, filter: AttendanceFilter::All } }

  pub fn on_date(role: MemberRole, date: NaiveDate) -> Self {
    Self { role, filter: AttendanceFilter::OnDate(date) }
  }

  pub fn latest(role: MemberRole, n: usize) -> Self {
    Self { role, filter: AttendanceFilter::Latest(n) }
  }

  /// Apply the query to a collection already in insertion order.
  ///
  /// Backends that cannot push the filter down to their storage use this;
  /// it is also the reference behaviour the SQLite backend matches.
  pub fn select(&self, mut entries: Vec<Keyed<AttendanceRecord>>) -> Vec<Keyed<AttendanceRecord>> {
    match self.filter {
      AttendanceFilter::All => entries,
      AttendanceFilter::OnDate(date) => {
        entries.retain(|e| e.value.date == date);
        entries
      }
      AttendanceFilter::Latest(n) => {
        // Stable sort keeps insertion order between equal timestamps.
        entries.sort_by_key(|e| e.value.timestamp);
        let skip = entries.len().saturating_sub(n);
        entries.split_off(skip)
      }
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the persistent collection store.
///
/// Writes are append-only pushes under a generated key and have no timeout;
/// once issued they run to completion or error. All methods return `Send`
/// futures so live views can be pumped from spawned tasks.
pub trait RollStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Append a user record to `users/{role}s`.
  fn push_user(
    &self,
    record: UserRecord,
  ) -> impl Future<Output = Result<Keyed<UserRecord>, Self::Error>> + Send + '_;

  /// Append an attendance record to `attendance/{record.role}s`.
  fn push_attendance(
    &self,
    record: AttendanceRecord,
  ) -> impl Future<Output = Result<Keyed<AttendanceRecord>, Self::Error>> + Send + '_;

  // ── One-shot reads ────────────────────────────────────────────────────

  /// Read `users/{role}s` once, in insertion order.
  fn users_once(
    &self,
    role: MemberRole,
  ) -> impl Future<Output = Result<Snapshot<UserRecord>, Self::Error>> + Send + '_;

  /// Read an attendance query once.
  fn attendance_once(
    &self,
    query: AttendanceQuery,
  ) -> impl Future<Output = Result<Snapshot<AttendanceRecord>, Self::Error>> + Send + '_;

  // ── Live subscriptions ────────────────────────────────────────────────

  /// Subscribe to `users/{role}s`. The current snapshot is delivered
  /// immediately, then again after every change.
  fn subscribe_users(
    &self,
    role: MemberRole,
  ) -> impl Future<Output = Result<Subscription<UserRecord>, Self::Error>> + Send + '_;

  /// Subscribe to an attendance query, re-evaluated after every change to
  /// the underlying collection.
  fn subscribe_attendance(
    &self,
    query: AttendanceQuery,
  ) -> impl Future<Output = Result<Subscription<AttendanceRecord>, Self::Error>> + Send + '_;
}
