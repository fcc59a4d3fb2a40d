//! Sign-in roles and the member roles that own collections.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// A role a user can sign in as.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Owner,
  Teacher,
  Student,
}

impl Role {
  /// Human-readable title used in greetings and banners.
  pub fn title(self) -> &'static str {
    match self {
      Self::Owner => "Owner",
      Self::Teacher => "Teacher",
      Self::Student => "Student",
    }
  }

  /// The member role backing this sign-in role, if it has one. The owner
  /// neither appears in the directory nor records attendance.
  pub fn member(self) -> Option<MemberRole> {
    match self {
      Self::Owner => None,
      Self::Teacher => Some(MemberRole::Teacher),
      Self::Student => Some(MemberRole::Student),
    }
  }
}

/// A role that owns a directory collection and an attendance collection.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MemberRole {
  Teacher,
  Student,
}

impl MemberRole {
  /// Collection segment under `users/` and `attendance/`.
  pub fn collection(self) -> &'static str {
    match self {
      Self::Teacher => "teachers",
      Self::Student => "students",
    }
  }

  pub fn role(self) -> Role {
    match self {
      Self::Teacher => Role::Teacher,
      Self::Student => Role::Student,
    }
  }

  pub fn title(self) -> &'static str { self.role().title() }
}
