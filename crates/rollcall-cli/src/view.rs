//! Terminal presentation state and the [`Surface`] implementation that the
//! controller, live-view pumps, and banner timers write into.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::NaiveDate;
use rollcall_core::{
  attendance::ReasonPrompt,
  capture::LocationReport,
  forms::register_fields,
  notify::Banner,
  render::{Region, RegionId},
  role::{MemberRole, Role},
  stats::Stats,
  surface::{Profile, Surface, Tab},
  user::Registration,
};

// ─── Register form ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterField {
  Role,
  Name,
  /// Class for students, subject for teachers.
  Detail,
  Submit,
}

impl RegisterField {
  const ORDER: [RegisterField; 4] = [Self::Role, Self::Name, Self::Detail, Self::Submit];

  pub fn next(self) -> Self {
    let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
    Self::ORDER[(i + 1) % Self::ORDER.len()]
  }

  pub fn prev(self) -> Self {
    let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
    Self::ORDER[(i + Self::ORDER.len() - 1) % Self::ORDER.len()]
  }
}

#[derive(Debug, Clone)]
pub struct RegisterForm {
  pub role:    MemberRole,
  pub name:    String,
  pub class:   String,
  pub subject: String,
  pub focus:   RegisterField,
}

impl Default for RegisterForm {
  fn default() -> Self {
    Self {
      role:    MemberRole::Teacher,
      name:    String::new(),
      class:   String::new(),
      subject: String::new(),
      focus:   RegisterField::Role,
    }
  }
}

impl RegisterForm {
  pub fn toggle_role(&mut self) {
    self.role = match self.role {
      MemberRole::Teacher => MemberRole::Student,
      MemberRole::Student => MemberRole::Teacher,
    };
  }

  pub fn detail_label(&self) -> &'static str {
    if register_fields(self.role).class { "Class" } else { "Subject" }
  }

  pub fn detail(&self) -> &str {
    if register_fields(self.role).class { &self.class } else { &self.subject }
  }

  /// The text field under focus, if any.
  pub fn focused_text(&mut self) -> Option<&mut String> {
    match self.focus {
      RegisterField::Name => Some(&mut self.name),
      RegisterField::Detail if register_fields(self.role).class => Some(&mut self.class),
      RegisterField::Detail => Some(&mut self.subject),
      RegisterField::Role | RegisterField::Submit => None,
    }
  }

  /// Form values for the visible fields only.
  pub fn to_registration(&self) -> Registration {
    let fields = register_fields(self.role);
    let mut form = Registration::new(self.role, self.name.clone());
    if fields.class {
      form = form.with_class(self.class.clone());
    }
    if fields.subject {
      form = form.with_subject(self.subject.clone());
    }
    form
  }
}

// ─── View state ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerView {
  pub banner:  Banner,
  /// Playing the exit transition.
  pub leaving: bool,
}

/// Everything the terminal draws, plus the contents of its input widgets.
#[derive(Debug)]
pub struct ViewState {
  pub dashboard:       Option<Role>,
  pub tab:             Option<Tab>,
  pub regions:         HashMap<RegionId, Region>,
  pub stats:           Option<Stats>,
  pub loading:         bool,
  pub banners:         Vec<BannerView>,
  pub reason_prompt:   Option<ReasonPrompt>,
  pub camera:          Option<LocationReport>,
  pub profile:         Option<Profile>,
  pub attendance_date: Option<NaiveDate>,

  // Inputs
  pub login_role: Role,
  pub pin:        String,
  pub register:   RegisterForm,
  pub reason:     String,
}

impl Default for ViewState {
  fn default() -> Self {
    Self {
      dashboard:       None,
      tab:             None,
      regions:         HashMap::new(),
      stats:           None,
      loading:         false,
      banners:         Vec::new(),
      reason_prompt:   None,
      camera:          None,
      profile:         None,
      attendance_date: None,
      login_role:      Role::Owner,
      pin:             String::new(),
      register:        RegisterForm::default(),
      reason:          String::new(),
    }
  }
}

impl ViewState {
  pub fn region(&self, id: RegionId) -> Option<&Region> { self.regions.get(&id) }
}

// ─── Surface ─────────────────────────────────────────────────────────────────

/// Shared handle to the [`ViewState`]. Cloning is cheap.
#[derive(Clone, Default)]
pub struct TuiSurface {
  state: Arc<Mutex<ViewState>>,
}

impl TuiSurface {
  /// Lock the view state. A panic while holding the lock leaves the state
  /// usable, so poisoning is ignored.
  pub fn lock(&self) -> MutexGuard<'_, ViewState> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl Surface for TuiSurface {
  fn show_dashboard(&self, dashboard: Option<Role>) {
    let mut view = self.lock();
    view.dashboard = dashboard;
    view.tab = None;
    view.regions.clear();
    view.stats = None;
    view.profile = None;
    view.reason_prompt = None;
    view.camera = None;
    view.loading = false;
  }

  fn open_tab(&self, tab: Tab) { self.lock().tab = Some(tab); }

  fn rebuild(&self, region: Region) {
    self.lock().regions.insert(region.id, region);
  }

  fn set_stats(&self, stats: Stats) { self.lock().stats = Some(stats); }

  fn set_loading(&self, loading: bool) { self.lock().loading = loading; }

  fn show_banner(&self, banner: &Banner) {
    self.lock().banners.push(BannerView { banner: banner.clone(), leaving: false });
  }

  fn retire_banner(&self, id: u64) {
    if let Some(b) = self.lock().banners.iter_mut().find(|b| b.banner.id == id) {
      b.leaving = true;
    }
  }

  fn remove_banner(&self, id: u64) { self.lock().banners.retain(|b| b.banner.id != id); }

  fn show_reason_prompt(&self, prompt: &ReasonPrompt) {
    let mut view = self.lock();
    view.reason.clear();
    view.reason_prompt = Some(prompt.clone());
  }

  fn close_reason_prompt(&self) {
    let mut view = self.lock();
    view.reason_prompt = None;
    view.reason.clear();
  }

  fn show_camera(&self, location: &LocationReport) { self.lock().camera = Some(*location); }

  fn close_camera(&self) { self.lock().camera = None; }

  fn show_profile(&self, profile: &Profile) { self.lock().profile = Some(profile.clone()); }

  fn clear_register_form(&self) {
    let mut view = self.lock();
    let role = view.register.role;
    view.register = RegisterForm { role, ..RegisterForm::default() };
  }

  fn clear_pin(&self) { self.lock().pin.clear(); }
}

#[cfg(test)]
mod tests {
  use rollcall_core::notify::NoticeKind;

  use super::*;

  #[test]
  fn register_form_sends_visible_fields_only() {
    let mut form = RegisterForm::default();
    form.name = "Omar".into();
    form.class = "5A".into();
    form.subject = "Math".into();

    let teacher = form.to_registration();
    assert_eq!(teacher.class, "");
    assert_eq!(teacher.subject, "Math");

    form.toggle_role();
    assert_eq!(form.detail_label(), "Class");
    let student = form.to_registration();
    assert_eq!(student.class, "5A");
    assert_eq!(student.subject, "");
  }

  #[test]
  fn focus_cycles_through_fields() {
    let mut f = RegisterField::Role;
    for _ in 0..4 {
      f = f.next();
    }
    assert_eq!(f, RegisterField::Role);
    assert_eq!(RegisterField::Role.prev(), RegisterField::Submit);
  }

  #[test]
  fn banners_stack_and_leave() {
    let surface = TuiSurface::default();
    for id in [1, 2] {
      surface.show_banner(&Banner { id, kind: NoticeKind::Error, message: "Incorrect PIN".into() });
    }
    surface.retire_banner(1);
    {
      let view = surface.lock();
      assert_eq!(view.banners.len(), 2);
      assert!(view.banners[0].leaving && !view.banners[1].leaving);
    }
    surface.remove_banner(1);
    assert_eq!(surface.lock().banners.len(), 1);
  }

  #[test]
  fn clearing_form_keeps_selected_role() {
    let surface = TuiSurface::default();
    {
      let mut view = surface.lock();
      view.register.toggle_role();
      view.register.name = "Sara".into();
    }
    surface.clear_register_form();
    let view = surface.lock();
    assert_eq!(view.register.role, MemberRole::Student);
    assert!(view.register.name.is_empty());
  }
}
