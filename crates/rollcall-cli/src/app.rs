//! Key dispatcher: turns terminal input into controller calls.

use std::sync::Arc;

use chrono::{Duration, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rollcall_core::{
  Controller,
  attendance::Status,
  forms,
  role::Role,
  store::RollStore,
  surface::Tab,
  user::Pin,
};
use strum::IntoEnumIterator;
use tracing::debug;

use crate::{
  devices::{ConfiguredLocation, StillFileCamera},
  view::{RegisterField, TuiSurface},
};

pub type RollController<S> = Controller<S, TuiSurface, ConfiguredLocation, StillFileCamera>;

/// Top-level application: the controller plus the surface it draws into.
pub struct App<S: RollStore> {
  pub surface: Arc<TuiSurface>,
  controller:  RollController<S>,
}

impl<S: RollStore> App<S> {
  pub fn new(
    store: S,
    surface: Arc<TuiSurface>,
    geolocation: ConfiguredLocation,
    camera: StillFileCamera,
  ) -> Self {
    let controller = Controller::new(store, surface.clone(), geolocation, camera);
    Self { surface, controller }
  }

  #[cfg(test)]
  pub fn controller(&self) -> &RollController<S> { &self.controller }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  ///
  /// Handler failures have already been shown as banners, so they are only
  /// logged here.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C / Ctrl-Q quit, Ctrl-L signs out.
    if key.modifiers.contains(KeyModifiers::CONTROL) {
      match key.code {
        KeyCode::Char('c') | KeyCode::Char('q') => return Ok(false),
        KeyCode::Char('l') => {
          if self.controller.session().is_some() {
            self.controller.logout();
          }
          return Ok(true);
        }
        _ => {}
      }
    }

    // Modals take every key while open.
    let (prompt_open, camera_open, dashboard) = {
      let view = self.surface.lock();
      (view.reason_prompt.is_some(), view.camera.is_some(), view.dashboard)
    };
    if prompt_open {
      return self.handle_reason_key(key).await;
    }
    if camera_open {
      return self.handle_camera_key(key).await;
    }

    match dashboard {
      None => self.handle_login_key(key).await,
      Some(Role::Owner) => self.handle_owner_key(key).await,
      Some(Role::Teacher) => self.handle_teacher_key(key).await,
      Some(Role::Student) => self.handle_student_key(key).await,
    }
  }

  async fn handle_login_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Esc => return Ok(false),
      KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
        let mut view = self.surface.lock();
        let roles: Vec<Role> = Role::iter().collect();
        let i = roles.iter().position(|r| *r == view.login_role).unwrap_or(0);
        let step = if matches!(key.code, KeyCode::Left | KeyCode::BackTab) {
          roles.len() - 1
        } else {
          1
        };
        view.login_role = roles[(i + step) % roles.len()];
      }
      KeyCode::Char(c) if c.is_ascii_digit() => {
        let mut view = self.surface.lock();
        if view.pin.len() < Pin::DIGITS {
          view.pin.push(c);
        }
      }
      KeyCode::Backspace => {
        self.surface.lock().pin.pop();
      }
      KeyCode::Enter => {
        let (role, pin) = {
          let view = self.surface.lock();
          (view.login_role, view.pin.clone())
        };
        if let Err(e) = self.controller.login(role, &pin).await {
          debug!(error = %e, "sign-in failed");
        }
        self.sync_attendance_date();
      }
      _ => {}
    }
    Ok(true)
  }

  // ── Owner ─────────────────────────────────────────────────────────────────

  async fn handle_owner_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if self.switch_tab(key, Role::Owner).await {
      return Ok(true);
    }
    let tab = self.surface.lock().tab;
    match tab {
      Some(Tab::Register) => self.handle_register_key(key).await,
      Some(Tab::Reports) if key.code == KeyCode::Char('r') => {
        let _ = self.controller.refresh_stats().await;
      }
      _ => {}
    }
    Ok(true)
  }

  async fn handle_register_key(&mut self, key: KeyEvent) {
    let submit = {
      let mut view = self.surface.lock();
      let form = &mut view.register;
      match key.code {
        KeyCode::Down => {
          form.focus = form.focus.next();
          false
        }
        KeyCode::Up => {
          form.focus = form.focus.prev();
          false
        }
        KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
          if form.focus == RegisterField::Role =>
        {
          form.toggle_role();
          false
        }
        KeyCode::Char(c) => {
          if let Some(text) = form.focused_text() {
            text.push(c);
          }
          false
        }
        KeyCode::Backspace => {
          if let Some(text) = form.focused_text() {
            text.pop();
          }
          false
        }
        KeyCode::Enter => true,
        _ => false,
      }
    };

    if submit {
      let form = self.surface.lock().register.to_registration();
      if let Err(e) = self.controller.register(form).await {
        debug!(error = %e, "registration failed");
      }
    }
  }

  // ── Teacher / student ─────────────────────────────────────────────────────

  async fn handle_teacher_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if self.switch_tab(key, Role::Teacher).await {
      return Ok(true);
    }
    let tab = self.surface.lock().tab;
    match tab {
      Some(Tab::CheckIn) => self.handle_check_in_key(key).await,
      Some(Tab::StudentsAttendance) => {
        let date = self.controller.attendance_date();
        let next = match key.code {
          KeyCode::Left | KeyCode::Char('[') => Some(date - Duration::days(1)),
          KeyCode::Right | KeyCode::Char(']') => Some(date + Duration::days(1)),
          KeyCode::Char('t') => Some(forms::default_attendance_date(Utc::now())),
          _ => None,
        };
        if let Some(date) = next {
          self.controller.set_attendance_date(date).await;
          self.sync_attendance_date();
        }
      }
      _ => {}
    }
    Ok(true)
  }

  async fn handle_student_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    self.handle_check_in_key(key).await;
    Ok(true)
  }

  async fn handle_check_in_key(&mut self, key: KeyEvent) {
    let status = match key.code {
      KeyCode::Char('p') => Status::Present,
      KeyCode::Char('l') => Status::Leave,
      KeyCode::Char('s') => Status::Sick,
      _ => return,
    };
    if let Err(e) = self.controller.start_check_in(status).await {
      debug!(error = %e, "check-in not started");
    }
  }

  // ── Modals ────────────────────────────────────────────────────────────────

  async fn handle_reason_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Esc => self.controller.close_reason_prompt(),
      KeyCode::Enter => {
        let reason = self.surface.lock().reason.clone();
        if let Err(e) = self.controller.submit_reason(&reason).await {
          debug!(error = %e, "reason not accepted");
        }
      }
      KeyCode::Backspace => {
        self.surface.lock().reason.pop();
      }
      KeyCode::Char(c) => self.surface.lock().reason.push(c),
      _ => {}
    }
    Ok(true)
  }

  async fn handle_camera_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Esc => self.controller.close_camera(),
      KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('c') => {
        if let Err(e) = self.controller.capture_photo().await {
          debug!(error = %e, "capture failed");
        }
      }
      _ => {}
    }
    Ok(true)
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  /// Tab / Shift-Tab cycle the dashboard's tabs. Returns whether the key was
  /// consumed.
  async fn switch_tab(&mut self, key: KeyEvent, role: Role) -> bool {
    let tabs = Tab::for_dashboard(role);
    let forward = match key.code {
      KeyCode::Tab => true,
      KeyCode::BackTab => false,
      _ => return false,
    };
    if tabs.is_empty() {
      return true;
    }
    let current = self.surface.lock().tab;
    let i = current.and_then(|t| tabs.iter().position(|x| *x == t)).unwrap_or(0);
    let next = if forward { (i + 1) % tabs.len() } else { (i + tabs.len() - 1) % tabs.len() };
    self.controller.open_tab(tabs[next]).await;
    true
  }

  fn sync_attendance_date(&self) {
    let date = self.controller.attendance_date();
    self.surface.lock().attendance_date = Some(date);
  }
}
