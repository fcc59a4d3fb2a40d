//! In-memory fakes shared by the unit tests.

use std::{
  collections::HashMap,
  sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
  attendance::{AttendanceRecord, Location, ReasonPrompt, Status},
  capture::{
    CameraError, CameraProvider, CameraStream, GeolocationError, GeolocationProvider,
    LocationReport, PositionOptions, StillImage, VideoConstraints,
  },
  notify::{Banner, NoticeKind},
  render::{Region, RegionId},
  role::{MemberRole, Role},
  stats::Stats,
  store::{AttendanceQuery, Collection, Keyed, RollStore, Snapshot},
  subscription::{self, Subscription},
  surface::{Profile, Surface, Tab},
  user::UserRecord,
};

// ─── Builders ────────────────────────────────────────────────────────────────

pub fn fix() -> Location {
  Location {
    latitude:  30.044420,
    longitude: 31.235712,
    accuracy:  12.4,
    timestamp: Utc.with_ymd_and_hms(2026, 10, 16, 7, 30, 0).unwrap(),
  }
}

pub fn attendance(role: MemberRole, at: DateTime<Utc>) -> AttendanceRecord {
  AttendanceRecord {
    role,
    user_name: role.to_string(),
    user_id: Uuid::new_v4(),
    status: Status::Present,
    date: at.date_naive(),
    time_in: at.format("%H:%M:%S").to_string(),
    time_out: String::new(),
    location: None,
    photo: None,
    reason: None,
    timestamp: at,
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Collections {
  users:      HashMap<MemberRole, Vec<Keyed<UserRecord>>>,
  attendance: HashMap<MemberRole, Vec<Keyed<AttendanceRecord>>>,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct MemoryError(String);

/// A `RollStore` held in memory, with switchable write failures.
#[derive(Clone)]
pub struct MemoryStore {
  data:        Arc<Mutex<Collections>>,
  changes:     broadcast::Sender<Collection>,
  fail_writes: Arc<AtomicBool>,
  writes:      Arc<AtomicUsize>,
}

impl MemoryStore {
  pub fn new() -> Self {
    let (changes, _) = broadcast::channel(64);
    Self {
      data: Arc::default(),
      changes,
      fail_writes: Arc::default(),
      writes: Arc::default(),
    }
  }

  pub fn fail_writes(&self, fail: bool) { self.fail_writes.store(fail, Ordering::SeqCst); }

  /// Number of write calls that reached the store, failed or not.
  pub fn writes(&self) -> usize { self.writes.load(Ordering::SeqCst) }

  pub fn attendance(&self, role: MemberRole) -> Vec<AttendanceRecord> {
    let data = self.data.lock().unwrap();
    data
      .attendance
      .get(&role)
      .map(|v| v.iter().map(|e| e.value.clone()).collect())
      .unwrap_or_default()
  }

  pub fn users(&self, role: MemberRole) -> Vec<UserRecord> {
    let data = self.data.lock().unwrap();
    data
      .users
      .get(&role)
      .map(|v| v.iter().map(|e| e.value.clone()).collect())
      .unwrap_or_default()
  }

  fn check_write(&self) -> Result<(), MemoryError> {
    self.writes.fetch_add(1, Ordering::SeqCst);
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(MemoryError("permission denied".into()));
    }
    Ok(())
  }

  fn read_users(&self, role: MemberRole) -> Snapshot<UserRecord> {
    let data = self.data.lock().unwrap();
    Snapshot::new(data.users.get(&role).cloned().unwrap_or_default())
  }

  fn read_attendance(&self, query: AttendanceQuery) -> Snapshot<AttendanceRecord> {
    let entries = {
      let data = self.data.lock().unwrap();
      data.attendance.get(&query.role).cloned().unwrap_or_default()
    };
    Snapshot::new(query.select(entries))
  }
}

impl RollStore for MemoryStore {
  type Error = MemoryError;

  async fn push_user(&self, record: UserRecord) -> Result<Keyed<UserRecord>, MemoryError> {
    self.check_write()?;
    let role = record.role;
    let entry = Keyed { key: Uuid::new_v4().to_string(), value: record };
    self.data.lock().unwrap().users.entry(role).or_default().push(entry.clone());
    let _ = self.changes.send(Collection::Users(role));
    Ok(entry)
  }

  async fn push_attendance(
    &self,
    record: AttendanceRecord,
  ) -> Result<Keyed<AttendanceRecord>, MemoryError> {
    self.check_write()?;
    let role = record.role;
    let entry = Keyed { key: Uuid::new_v4().to_string(), value: record };
    self.data.lock().unwrap().attendance.entry(role).or_default().push(entry.clone());
    let _ = self.changes.send(Collection::Attendance(role));
    Ok(entry)
  }

  async fn users_once(&self, role: MemberRole) -> Result<Snapshot<UserRecord>, MemoryError> {
    Ok(self.read_users(role))
  }

  async fn attendance_once(
    &self,
    query: AttendanceQuery,
  ) -> Result<Snapshot<AttendanceRecord>, MemoryError> {
    Ok(self.read_attendance(query))
  }

  async fn subscribe_users(
    &self,
    role: MemberRole,
  ) -> Result<Subscription<UserRecord>, MemoryError> {
    let (publisher, sub) = subscription::channel();
    let store = self.clone();
    subscription::spawn_feed(
      Collection::Users(role),
      self.changes.subscribe(),
      publisher,
      move || {
        let snapshot = store.read_users(role);
        async move { Ok::<_, MemoryError>(snapshot) }
      },
    );
    Ok(sub)
  }

  async fn subscribe_attendance(
    &self,
    query: AttendanceQuery,
  ) -> Result<Subscription<AttendanceRecord>, MemoryError> {
    let (publisher, sub) = subscription::channel();
    let store = self.clone();
    subscription::spawn_feed(
      Collection::Attendance(query.role),
      self.changes.subscribe(),
      publisher,
      move || {
        let snapshot = store.read_attendance(query);
        async move { Ok::<_, MemoryError>(snapshot) }
      },
    );
    Ok(sub)
  }
}

// ─── Devices ─────────────────────────────────────────────────────────────────

pub enum FakeGeolocation {
  Fix(Location),
  Denied,
  /// Never answers.
  Hang,
}

impl GeolocationProvider for FakeGeolocation {
  async fn current_position(&self, _: PositionOptions) -> Result<Location, GeolocationError> {
    match self {
      Self::Fix(loc) => Ok(*loc),
      Self::Denied => Err(GeolocationError::PermissionDenied),
      Self::Hang => std::future::pending().await,
    }
  }
}

#[derive(Default)]
struct CameraLog {
  allowed:      AtomicBool,
  requests:     AtomicUsize,
  stops:        AtomicUsize,
  captures:     AtomicUsize,
  last_capture: Mutex<Option<(u32, u32, f32)>>,
}

/// Camera whose permission can be toggled; counts requests and track stops.
#[derive(Clone, Default)]
pub struct FakeCamera {
  log: Arc<CameraLog>,
}

impl FakeCamera {
  pub fn granted() -> Self {
    let cam = Self::default();
    cam.set_allowed(true);
    cam
  }

  pub fn denied() -> Self { Self::default() }

  pub fn set_allowed(&self, allowed: bool) { self.log.allowed.store(allowed, Ordering::SeqCst); }

  pub fn requests(&self) -> usize { self.log.requests.load(Ordering::SeqCst) }

  pub fn stops(&self) -> usize { self.log.stops.load(Ordering::SeqCst) }

  pub fn captures(&self) -> usize { self.log.captures.load(Ordering::SeqCst) }

  pub fn last_capture(&self) -> Option<(u32, u32, f32)> { *self.log.last_capture.lock().unwrap() }
}

pub struct FakeStream {
  log: Arc<CameraLog>,
}

impl CameraStream for FakeStream {
  fn video_size(&self) -> (u32, u32) { (1280, 720) }

  fn capture_still(
    &mut self,
    width: u32,
    height: u32,
    quality: f32,
  ) -> Result<StillImage, CameraError> {
    self.log.captures.fetch_add(1, Ordering::SeqCst);
    *self.log.last_capture.lock().unwrap() = Some((width, height, quality));
    Ok(StillImage {
      mime: "image/jpeg".into(),
      width,
      height,
      bytes: vec![0xff, 0xd8, 0xff, 0xe0],
    })
  }

  fn stop_all_tracks(&mut self) { self.log.stops.fetch_add(1, Ordering::SeqCst); }
}

impl CameraProvider for FakeCamera {
  type Stream = FakeStream;

  async fn request_video_stream(&self, _: VideoConstraints) -> Result<FakeStream, CameraError> {
    self.log.requests.fetch_add(1, Ordering::SeqCst);
    if !self.log.allowed.load(Ordering::SeqCst) {
      return Err(CameraError::Denied("NotAllowedError".into()));
    }
    Ok(FakeStream { log: self.log.clone() })
  }
}

// ─── Surface ─────────────────────────────────────────────────────────────────

/// Everything the controller asked the surface to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
  Dashboard(Option<Role>),
  Tab(Tab),
  Rebuild(Region),
  Stats(Stats),
  Loading(bool),
  Banner(Banner),
  RetireBanner(u64),
  RemoveBanner(u64),
  ReasonPrompt(ReasonPrompt),
  CloseReasonPrompt,
  Camera(LocationReport),
  CloseCamera,
  Profile(Profile),
  ClearRegisterForm,
  ClearPin,
}

#[derive(Clone, Default)]
pub struct RecordingSurface {
  events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingSurface {
  pub fn events(&self) -> Vec<Event> { self.events.lock().unwrap().clone() }

  pub fn clear(&self) { self.events.lock().unwrap().clear(); }

  pub fn banners(&self) -> Vec<Banner> {
    self
      .events()
      .into_iter()
      .filter_map(|e| match e {
        Event::Banner(b) => Some(b),
        _ => None,
      })
      .collect()
  }

  pub fn last_banner(&self) -> Option<(NoticeKind, String)> {
    self.banners().pop().map(|b| (b.kind, b.message))
  }

  /// The most recent rebuild of `id`.
  pub fn region(&self, id: RegionId) -> Option<Region> {
    self.events().into_iter().rev().find_map(|e| match e {
      Event::Rebuild(r) if r.id == id => Some(r),
      _ => None,
    })
  }

  pub fn last_stats(&self) -> Option<Stats> {
    self.events().into_iter().rev().find_map(|e| match e {
      Event::Stats(s) => Some(s),
      _ => None,
    })
  }

  fn push(&self, event: Event) { self.events.lock().unwrap().push(event); }
}

impl Surface for RecordingSurface {
  fn show_dashboard(&self, dashboard: Option<Role>) { self.push(Event::Dashboard(dashboard)); }
  fn open_tab(&self, tab: Tab) { self.push(Event::Tab(tab)); }
  fn rebuild(&self, region: Region) { self.push(Event::Rebuild(region)); }
  fn set_stats(&self, stats: Stats) { self.push(Event::Stats(stats)); }
  fn set_loading(&self, loading: bool) { self.push(Event::Loading(loading)); }
  fn show_banner(&self, banner: &Banner) { self.push(Event::Banner(banner.clone())); }
  fn retire_banner(&self, id: u64) { self.push(Event::RetireBanner(id)); }
  fn remove_banner(&self, id: u64) { self.push(Event::RemoveBanner(id)); }
  fn show_reason_prompt(&self, prompt: &ReasonPrompt) { self.push(Event::ReasonPrompt(prompt.clone())); }
  fn close_reason_prompt(&self) { self.push(Event::CloseReasonPrompt); }
  fn show_camera(&self, location: &LocationReport) { self.push(Event::Camera(*location)); }
  fn close_camera(&self) { self.push(Event::CloseCamera); }
  fn show_profile(&self, profile: &Profile) { self.push(Event::Profile(profile.clone())); }
  fn clear_register_form(&self) { self.push(Event::ClearRegisterForm); }
  fn clear_pin(&self) { self.push(Event::ClearPin); }
}

/// Let spawned feed and pump tasks run until they go quiet.
pub async fn settle() {
  for _ in 0..20 {
    tokio::task::yield_now().await;
  }
}
