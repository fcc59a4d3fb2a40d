//! Layered runtime configuration: an optional TOML file, then `ROLLCALL_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Runtime configuration, deserialised from `rollcall.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default = "default_log_path")]
  pub log_path:   PathBuf,
  /// Fixed position reported as the device location. Absent means the
  /// device cannot determine its location.
  #[serde(default)]
  pub location:   Option<LocationSettings>,
  /// Still image served as the camera frame. Absent means camera access is
  /// denied.
  #[serde(default)]
  pub camera:     Option<CameraSettings>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LocationSettings {
  pub latitude:  f64,
  pub longitude: f64,
  #[serde(default = "default_accuracy")]
  pub accuracy:  f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CameraSettings {
  pub still_path: PathBuf,
  #[serde(default = "default_width")]
  pub width:      u32,
  #[serde(default = "default_height")]
  pub height:     u32,
}

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/rollcall/rollcall.db") }

fn default_log_path() -> PathBuf { PathBuf::from("rollcall.log") }

fn default_accuracy() -> f64 { 10.0 }

fn default_width() -> u32 { 1280 }

fn default_height() -> u32 { 720 }

impl Settings {
  /// Read `path` if it exists, then apply `ROLLCALL_*` overrides. Nested
  /// keys use `__`, e.g. `ROLLCALL_CAMERA__STILL_PATH`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("ROLLCALL")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise settings")
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
