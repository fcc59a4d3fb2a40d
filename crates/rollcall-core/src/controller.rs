//! Top-level controller: owns the session context, the capture pipeline, and
//! the live views, and turns user actions into store calls and surface
//! instructions.
//!
//! Every handler reports failures to the user through a banner itself and
//! also returns the error, so callers only need to log it.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  attendance::{PendingAttendance, Status},
  capture::{CameraProvider, CaptureOutput, CapturePipeline, CaptureState, GeolocationProvider},
  credentials::CredentialStore,
  directory, forms,
  live::LiveViews,
  notify::Notifier,
  recorder::{self, CheckInStep},
  render::AttendanceView,
  role::{MemberRole, Role},
  session::{Session, SessionContext},
  stats,
  store::RollStore,
  surface::{Surface, Tab},
  user::Registration,
};

pub struct Controller<S, U, G, C: CameraProvider> {
  store:           S,
  surface:         Arc<U>,
  notifier:        Notifier<U>,
  credentials:     CredentialStore,
  context:         SessionContext,
  capture:         CapturePipeline<G, C>,
  views:           LiveViews,
  attendance_date: NaiveDate,
}

impl<S, U, G, C> Controller<S, U, G, C>
where
  S: RollStore,
  U: Surface,
  G: GeolocationProvider,
  C: CameraProvider,
{
  pub fn new(store: S, surface: Arc<U>, geolocation: G, camera: C) -> Self {
    Self {
      store,
      notifier: Notifier::new(surface.clone()),
      surface,
      credentials: CredentialStore,
      context: SessionContext::default(),
      capture: CapturePipeline::new(geolocation, camera),
      views: LiveViews::new(),
      attendance_date: forms::default_attendance_date(Utc::now()),
    }
  }

  // ── Accessors ─────────────────────────────────────────────────────────────

  pub fn session(&self) -> Option<&Session> { self.context.session() }

  pub fn pending(&self) -> Option<&PendingAttendance> { self.context.pending() }

  pub fn capture_state(&self) -> CaptureState { self.capture.state() }

  pub fn attendance_date(&self) -> NaiveDate { self.attendance_date }

  pub fn store(&self) -> &S { &self.store }

  // ── Sign-in ───────────────────────────────────────────────────────────────

  pub async fn login(&mut self, role: Role, pin: &str) -> Result<()> {
    let session = match self.credentials.sign_in(role, pin) {
      Ok(session) => session,
      Err(e) => {
        info!(%role, "sign-in rejected");
        self.notifier.error(e.to_string());
        return Err(e);
      }
    };

    info!(%role, session = %session.session_id, "signed in");
    self.views.detach_all();
    self.capture.cancel();
    self.context.sign_in(session);
    self.surface.show_dashboard(Some(role));
    self.show_dashboard(role).await;
    self.notifier.success(format!("Welcome {}", role.title()));
    Ok(())
  }

  async fn show_dashboard(&mut self, role: Role) {
    if let Some(first) = Tab::for_dashboard(role).first() {
      self.surface.open_tab(*first);
    }
    match role {
      Role::Owner => {
        self.attach_directories().await;
        let _ = self.refresh_stats().await;
      }
      Role::Teacher => {
        if let Some(session) = self.context.session() {
          self.surface.show_profile(&forms::teacher_profile(session));
        }
        self.attach_attendance(AttendanceView::Day(self.attendance_date)).await;
      }
      Role::Student => {
        self.surface.show_profile(&forms::student_profile());
        self.attach_attendance(AttendanceView::History).await;
      }
    }
  }

  /// Sign out: drop the session and draft, release the camera, stop every
  /// live view, and return to the login view.
  pub fn logout(&mut self) {
    if let Some(session) = self.context.sign_out() {
      info!(role = %session.role, "signed out");
    }
    self.capture.cancel();
    self.views.detach_all();

    self.surface.show_dashboard(None);
    self.surface.clear_pin();
    self.surface.close_reason_prompt();
    self.surface.close_camera();
    self.notifier.success("Signed out successfully");
  }

  // ── Tabs ──────────────────────────────────────────────────────────────────

  /// Switch to `tab`. Opening the reports tab reloads the counts.
  pub async fn open_tab(&mut self, tab: Tab) {
    self.surface.open_tab(tab);
    if tab == Tab::Reports {
      let _ = self.refresh_stats().await;
    }
  }

  /// One-shot read of the aggregate counts.
  pub async fn refresh_stats(&mut self) -> Result<()> {
    match stats::load(&self.store, Utc::now().date_naive()).await {
      Ok(stats) => {
        self.surface.set_stats(stats);
        Ok(())
      }
      Err(e) => {
        warn!(error = %e, "could not load stats");
        self.notifier.error(format!("Could not load statistics: {e}"));
        Err(Error::store(e))
      }
    }
  }

  // ── Owner ─────────────────────────────────────────────────────────────────

  /// Register a teacher or student from the form values.
  ///
  /// On failure the form is left as-is so the owner can correct it.
  pub async fn register(&mut self, form: Registration) -> Result<()> {
    if let Err(e) = form.validate() {
      self.notifier.error(e.to_string());
      return Err(e.into());
    }

    let role = form.role;
    self.surface.set_loading(true);
    let result = directory::register(&self.store, form).await;
    self.surface.set_loading(false);

    match result {
      Ok(entry) => {
        self.notifier.success(format!(
          "{} registered successfully! PIN: {}",
          role.title(),
          entry.value.pin
        ));
        self.surface.clear_register_form();
        self.attach_directories().await;
        let _ = self.refresh_stats().await;
        Ok(())
      }
      Err(e) => {
        warn!(error = %e, "registration failed");
        self.notifier.error(format!("Registration failed: {e}"));
        Err(e)
      }
    }
  }

  // ── Teacher ───────────────────────────────────────────────────────────────

  /// Change the day shown in the teacher's attendance list.
  pub async fn set_attendance_date(&mut self, date: NaiveDate) {
    self.attendance_date = date;
    if self.context.session().is_some_and(|s| s.role == Role::Teacher) {
      self.attach_attendance(AttendanceView::Day(date)).await;
    }
  }

  // ── Check-in ──────────────────────────────────────────────────────────────

  /// Begin a check-in for the signed-in teacher or student.
  pub async fn start_check_in(&mut self, status: Status) -> Result<()> {
    let session = self.context.require_session()?;
    let role = session.role.member().ok_or(Error::NoAttendanceRole(session.role))?;

    let (pending, step) = recorder::start_check_in(role, status);
    debug!(%role, %status, "check-in started");
    self.context.begin(pending);

    match step {
      CheckInStep::Reason(prompt) => {
        self.surface.show_reason_prompt(&prompt);
        Ok(())
      }
      CheckInStep::Capture => self.begin_capture().await,
    }
  }

  /// Accept the reason typed into the prompt and continue to capture.
  pub async fn submit_reason(&mut self, reason: &str) -> Result<()> {
    let pending = self.context.pending_mut().ok_or(Error::NoPendingAttendance)?;
    if let Err(e) = pending.set_reason(reason) {
      self.notifier.error(e.to_string());
      return Err(e.into());
    }
    self.surface.close_reason_prompt();
    self.begin_capture().await
  }

  pub fn close_reason_prompt(&mut self) { self.surface.close_reason_prompt(); }

  async fn begin_capture(&mut self) -> Result<()> {
    self.surface.set_loading(true);
    let prepared = self.capture.prepare().await;
    self.surface.set_loading(false);

    match prepared {
      Ok(report) => {
        self.surface.show_camera(&report);
        Ok(())
      }
      Err(e) => {
        // The draft is kept so the user can retry.
        self.notifier.error(e.to_string());
        Err(e.into())
      }
    }
  }

  /// Take the photo, release the camera, and save the record.
  pub async fn capture_photo(&mut self) -> Result<()> {
    let captured = self.capture.capture();
    self.surface.close_camera();
    match captured {
      Ok(output) => self.save_attendance(output).await,
      Err(e) => {
        self.notifier.error(e.to_string());
        Err(e.into())
      }
    }
  }

  /// Close the camera view without submitting.
  pub fn close_camera(&mut self) {
    self.capture.cancel();
    self.surface.close_camera();
  }

  async fn save_attendance(&mut self, output: CaptureOutput) -> Result<()> {
    let session = self.context.require_session()?.clone();
    let pending = self.context.pending().cloned().ok_or(Error::NoPendingAttendance)?;

    self.surface.set_loading(true);
    let result = recorder::submit(&self.store, &session, &pending, output).await;
    self.surface.set_loading(false);

    match result {
      Ok(_) => {
        self.context.clear_pending();
        self.notifier.success("Attendance recorded!");
        match pending.role {
          MemberRole::Teacher => {
            self.attach_attendance(AttendanceView::Day(self.attendance_date)).await
          }
          MemberRole::Student => self.attach_attendance(AttendanceView::History).await,
        }
        Ok(())
      }
      Err(e) => {
        warn!(error = %e, "could not record attendance");
        self.notifier.error(format!("Could not record attendance: {e}"));
        Err(e)
      }
    }
  }

  // ── Live views ────────────────────────────────────────────────────────────

  async fn attach_directories(&mut self) {
    for role in [MemberRole::Teacher, MemberRole::Student] {
      if let Err(e) = self.views.attach_directory(&self.store, role, &self.surface).await {
        warn!(%role, error = %e, "could not subscribe to directory");
        self.notifier.error(format!("Could not load data: {e}"));
      }
    }
  }

  async fn attach_attendance(&mut self, view: AttendanceView) {
    if let Err(e) = self.views.attach_attendance(&self.store, view, &self.surface).await {
      warn!(?view, error = %e, "could not subscribe to attendance");
      self.notifier.error(format!("Could not load data: {e}"));
    }
  }
}
