//! Device providers for the terminal: a configured position fix and a camera
//! that serves a still image from disk.

use chrono::Utc;
use rollcall_core::{
  attendance::{Location, Photo},
  capture::{
    CameraError, CameraProvider, CameraStream, GeolocationError, GeolocationProvider,
    PositionOptions, StillImage, VideoConstraints,
  },
};
use tracing::debug;

use crate::config::{CameraSettings, LocationSettings};

// ─── Geolocation ─────────────────────────────────────────────────────────────

/// Reports the position from the config file, stamped with the current time.
pub struct ConfiguredLocation {
  fix: Option<LocationSettings>,
}

impl ConfiguredLocation {
  pub fn new(fix: Option<LocationSettings>) -> Self { Self { fix } }
}

impl GeolocationProvider for ConfiguredLocation {
  async fn current_position(&self, options: PositionOptions) -> Result<Location, GeolocationError> {
    debug!(high_accuracy = options.high_accuracy, "position requested");
    let fix = self.fix.ok_or(GeolocationError::Unsupported)?;
    Ok(Location {
      latitude:  fix.latitude,
      longitude: fix.longitude,
      accuracy:  fix.accuracy,
      timestamp: Utc::now(),
    })
  }
}

// ─── Camera ──────────────────────────────────────────────────────────────────

/// A camera whose every frame is the configured JPEG file.
///
/// No configuration, or a file that cannot be read, is reported as denied
/// access.
pub struct StillFileCamera {
  settings: Option<CameraSettings>,
}

impl StillFileCamera {
  pub fn new(settings: Option<CameraSettings>) -> Self { Self { settings } }
}

impl CameraProvider for StillFileCamera {
  type Stream = StillFileStream;

  async fn request_video_stream(
    &self,
    constraints: VideoConstraints,
  ) -> Result<StillFileStream, CameraError> {
    let settings = self
      .settings
      .as_ref()
      .ok_or_else(|| CameraError::Denied("no camera configured".into()))?;
    debug!(
      path = %settings.still_path.display(),
      ideal_width = constraints.ideal_width,
      ideal_height = constraints.ideal_height,
      "opening camera"
    );
    let frame = tokio::fs::read(&settings.still_path)
      .await
      .map_err(|e| CameraError::Denied(format!("{}: {e}", settings.still_path.display())))?;
    Ok(StillFileStream {
      frame,
      width: settings.width,
      height: settings.height,
      running: true,
    })
  }
}

pub struct StillFileStream {
  frame:   Vec<u8>,
  width:   u32,
  height:  u32,
  running: bool,
}

impl CameraStream for StillFileStream {
  fn video_size(&self) -> (u32, u32) { (self.width, self.height) }

  /// The file is already encoded, so `quality` is not applied.
  fn capture_still(
    &mut self,
    width: u32,
    height: u32,
    _quality: f32,
  ) -> Result<StillImage, CameraError> {
    if !self.running {
      return Err(CameraError::Frame("stream stopped".into()));
    }
    Ok(StillImage {
      mime: Photo::JPEG_MIME.to_owned(),
      width,
      height,
      bytes: self.frame.clone(),
    })
  }

  fn stop_all_tracks(&mut self) {
    self.running = false;
    debug!("camera stream stopped");
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use super::*;

  #[tokio::test]
  async fn unconfigured_devices_refuse() {
    let geo = ConfiguredLocation::new(None);
    assert_eq!(
      geo.current_position(PositionOptions::default()).await,
      Err(GeolocationError::Unsupported)
    );

    let camera = StillFileCamera::new(None);
    let err = camera.request_video_stream(VideoConstraints::default()).await.err();
    assert!(matches!(err, Some(CameraError::Denied(_))));
  }

  #[tokio::test]
  async fn missing_still_is_denied() {
    let camera = StillFileCamera::new(Some(CameraSettings {
      still_path: PathBuf::from("/nonexistent/frame.jpg"),
      width:      1280,
      height:     720,
    }));
    let err = camera.request_video_stream(VideoConstraints::default()).await.err();
    assert!(matches!(err, Some(CameraError::Denied(_))));
  }

  #[tokio::test]
  async fn still_file_is_served_until_stopped() {
    let path = std::env::temp_dir().join(format!("rollcall-still-{}.jpg", std::process::id()));
    std::fs::write(&path, [0xff, 0xd8, 0xff, 0xd9]).unwrap();
    let camera = StillFileCamera::new(Some(CameraSettings {
      still_path: path.clone(),
      width:      640,
      height:     480,
    }));

    let mut stream = camera.request_video_stream(VideoConstraints::default()).await.unwrap();
    assert_eq!(stream.video_size(), (640, 480));
    let still = stream.capture_still(640, 480, 0.8).unwrap();
    assert_eq!(still.mime, "image/jpeg");
    assert_eq!(still.bytes, vec![0xff, 0xd8, 0xff, 0xd9]);

    stream.stop_all_tracks();
    assert!(stream.capture_still(640, 480, 0.8).is_err());
    let _ = std::fs::remove_file(path);
  }

  #[tokio::test]
  async fn configured_fix_is_reported() {
    let geo = ConfiguredLocation::new(Some(LocationSettings {
      latitude:  30.0444,
      longitude: 31.2357,
      accuracy:  15.0,
    }));
    let loc = geo.current_position(PositionOptions::default()).await.unwrap();
    assert_eq!((loc.latitude, loc.longitude, loc.accuracy), (30.0444, 31.2357, 15.0));
  }
}
