//! The presentation surface the controller drives.
//!
//! The core never reads widgets. Its output is a stream of instructions
//! (rebuild this region, show this banner, open this modal); form values are
//! passed in by the caller as handler arguments.

use crate::{
  attendance::ReasonPrompt,
  capture::LocationReport,
  notify::Banner,
  render::Region,
  role::Role,
  stats::Stats,
};

/// A tab within one of the dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
  // Owner
  Register,
  Teachers,
  Students,
  Reports,
  // Teacher
  Profile,
  CheckIn,
  StudentsAttendance,
}

impl Tab {
  /// Tabs of a dashboard, in display order. The first one opens by default.
  pub fn for_dashboard(role: Role) -> &'static [Tab] {
    match role {
      Role::Owner => &[Tab::Register, Tab::Teachers, Tab::Students, Tab::Reports],
      Role::Teacher => &[Tab::Profile, Tab::CheckIn, Tab::StudentsAttendance],
      Role::Student => &[],
    }
  }

  pub fn title(self) -> &'static str {
    match self {
      Tab::Register => "Register",
      Tab::Teachers => "Teachers",
      Tab::Students => "Students",
      Tab::Reports => "Reports",
      Tab::Profile => "Profile",
      Tab::CheckIn => "Check in",
      Tab::StudentsAttendance => "Students' attendance",
    }
  }
}

/// Text for a profile panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
  pub heading: String,
  pub lines:   Vec<String>,
}

pub trait Surface: Send + Sync + 'static {
  /// Show a role's dashboard, or the login view for `None`.
  fn show_dashboard(&self, dashboard: Option<Role>);

  fn open_tab(&self, tab: Tab);

  /// Replace a list region's content entirely.
  fn rebuild(&self, region: Region);

  fn set_stats(&self, stats: Stats);

  fn set_loading(&self, loading: bool);

  fn show_banner(&self, banner: &Banner);

  /// Start a banner's exit transition.
  fn retire_banner(&self, id: u64);

  fn remove_banner(&self, id: u64);

  fn show_reason_prompt(&self, prompt: &ReasonPrompt);

  /// Hide the reason prompt and clear its input.
  fn close_reason_prompt(&self);

  /// Show the camera preview along with the location outcome.
  fn show_camera(&self, location: &LocationReport);

  fn close_camera(&self);

  fn show_profile(&self, profile: &Profile);

  fn clear_register_form(&self);

  fn clear_pin(&self);
}
