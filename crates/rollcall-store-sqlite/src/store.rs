//! [`SqliteStore`], the SQLite implementation of [`RollStore`].

use std::path::Path;

use rollcall_core::{
  attendance::AttendanceRecord,
  role::MemberRole,
  store::{AttendanceFilter, AttendanceQuery, Collection, Keyed, RollStore, Snapshot},
  subscription::{self, Subscription},
  user::UserRecord,
};
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RawAttendance, RawUser, encode_date, encode_dt, encode_location, encode_role,
    encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

/// Capacity of the in-process change feed. Slow feeds that fall further
/// behind reload instead of replaying.
const CHANGE_FEED_CAPACITY: usize = 64;

// ─── Store ───────────────────────────────────────────────────────────────────

/// An attendance store backed by a single SQLite file.
///
/// Cloning is cheap: the connection and the change feed are shared, so a
/// write through any clone reaches subscribers of every other.
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  changes: broadcast::Sender<Collection>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self::with_connection(conn);
    store.init_schema().await?;
    info!(path = %path.display(), "opened store");
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self::with_connection(conn);
    store.init_schema().await?;
    Ok(store)
  }

  fn with_connection(conn: tokio_rusqlite::Connection) -> Self {
    let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
    Self { conn, changes }
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  fn notify(&self, collection: Collection) {
    debug!(%collection, "collection changed");
    // No receivers simply means nothing is subscribed.
    let _ = self.changes.send(collection);
  }

  async fn read_users(&self, role: MemberRole) -> Result<Snapshot<UserRecord>> {
    let role_str = encode_role(role);

    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM users WHERE role = ?1 ORDER BY seq",
          RawUser::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![role_str], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let entries = raws
      .into_iter()
      .map(RawUser::into_keyed)
      .collect::<Result<Vec<_>>>()?;
    Ok(Snapshot::new(entries))
  }

  async fn read_attendance(&self, query: AttendanceQuery) -> Result<Snapshot<AttendanceRecord>> {
    let role_str = encode_role(query.role);
    let filter = query.filter;

    let raws: Vec<RawAttendance> = self
      .conn
      .call(move |conn| {
        let rows = match filter {
          AttendanceFilter::All => {
            let mut stmt = conn.prepare(&format!(
              "SELECT {} FROM attendance WHERE role = ?1 ORDER BY seq",
              RawAttendance::COLUMNS
            ))?;
            stmt
              .query_map(rusqlite::params![role_str], RawAttendance::from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
          AttendanceFilter::OnDate(date) => {
            let mut stmt = conn.prepare(&format!(
              "SELECT {} FROM attendance WHERE role = ?1 AND date = ?2 ORDER BY seq",
              RawAttendance::COLUMNS
            ))?;
            stmt
              .query_map(rusqlite::params![role_str, encode_date(date)], RawAttendance::from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?
          }
          AttendanceFilter::Latest(n) => {
            let limit = i64::try_from(n).unwrap_or(i64::MAX);
            let mut stmt = conn.prepare(&format!(
              "SELECT {} FROM attendance WHERE role = ?1
               ORDER BY timestamp DESC, seq DESC LIMIT ?2",
              RawAttendance::COLUMNS
            ))?;
            let mut rows = stmt
              .query_map(rusqlite::params![role_str, limit], RawAttendance::from_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?;
            // Oldest first, like every other read.
            rows.reverse();
            rows
          }
        };
        Ok(rows)
      })
      .await?;

    let entries = raws
      .into_iter()
      .map(RawAttendance::into_keyed)
      .collect::<Result<Vec<_>>>()?;
    Ok(Snapshot::new(entries))
  }
}

// ─── RollStore impl ──────────────────────────────────────────────────────────

impl RollStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn push_user(&self, record: UserRecord) -> Result<Keyed<UserRecord>> {
    let key = encode_uuid(Uuid::new_v4());

    let key_str     = key.clone();
    let role_str    = encode_role(record.role);
    let name        = record.name.clone();
    let class       = record.class.clone();
    let subject     = record.subject.clone();
    let at_str      = encode_dt(record.registered_at);
    let pin_str     = record.pin.as_str().to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (key, role, name, class, subject, registered_at, pin)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![key_str, role_str, name, class, subject, at_str, pin_str],
        )?;
        Ok(())
      })
      .await?;

    self.notify(Collection::Users(record.role));
    Ok(Keyed { key, value: record })
  }

  async fn push_attendance(&self, record: AttendanceRecord) -> Result<Keyed<AttendanceRecord>> {
    let key = encode_uuid(Uuid::new_v4());

    let key_str      = key.clone();
    let role_str     = encode_role(record.role);
    let user_name    = record.user_name.clone();
    let user_id_str  = encode_uuid(record.user_id);
    let status_str   = encode_status(record.status);
    let date_str     = encode_date(record.date);
    let time_in      = record.time_in.clone();
    let time_out     = record.time_out.clone();
    let location_str = record.location.as_ref().map(encode_location).transpose()?;
    let photo        = record.photo.as_ref().map(|p| p.as_data_url().to_owned());
    let reason       = record.reason.clone();
    let ts_str       = encode_dt(record.timestamp);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO attendance (
             key, role, user_name, user_id, status, date,
             time_in, time_out, location, photo, reason, timestamp
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            key_str,
            role_str,
            user_name,
            user_id_str,
            status_str,
            date_str,
            time_in,
            time_out,
            location_str,
            photo,
            reason,
            ts_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    self.notify(Collection::Attendance(record.role));
    Ok(Keyed { key, value: record })
  }

  // ── One-shot reads ────────────────────────────────────────────────────────

  async fn users_once(&self, role: MemberRole) -> Result<Snapshot<UserRecord>> {
    self.read_users(role).await
  }

  async fn attendance_once(&self, query: AttendanceQuery) -> Result<Snapshot<AttendanceRecord>> {
    self.read_attendance(query).await
  }

  // ── Live subscriptions ────────────────────────────────────────────────────

  async fn subscribe_users(&self, role: MemberRole) -> Result<Subscription<UserRecord>> {
    let (publisher, sub) = subscription::channel();
    let changes = self.changes.subscribe();
    let store = self.clone();
    subscription::spawn_feed(Collection::Users(role), changes, publisher, move || {
      let store = store.clone();
      async move { store.read_users(role).await }
    });
    Ok(sub)
  }

  async fn subscribe_attendance(
    &self,
    query: AttendanceQuery,
  ) -> Result<Subscription<AttendanceRecord>> {
    let (publisher, sub) = subscription::channel();
    let changes = self.changes.subscribe();
    let store = self.clone();
    subscription::spawn_feed(Collection::Attendance(query.role), changes, publisher, move || {
      let store = store.clone();
      async move { store.read_attendance(query).await }
    });
    Ok(sub)
  }
}
