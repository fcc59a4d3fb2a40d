//! Capture pipeline: a best-effort location fix, then a camera stream, then a
//! still photo.
//!
//! ```text
//! Idle → AcquiringLocation → AcquiringCamera → Ready → Captured
//!                                                   └→ Cancelled
//! ```
//!
//! A geolocation failure or timeout is not fatal; the pipeline continues with
//! no location. A camera failure aborts the attempt. The camera stream is held
//! in a [`StreamGuard`], so its hardware tracks are stopped on capture, on
//! cancel, and whenever the pipeline itself is dropped.

use std::{future::Future, time::Duration};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::attendance::{Location, Photo};

/// How long to wait for a position fix.
pub const LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// JPEG quality used for the still photo.
pub const PHOTO_QUALITY: f32 = 0.8;

// ─── Geolocation ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
  pub high_accuracy: bool,
  pub timeout:       Duration,
  /// Maximum age of a cached fix the provider may return.
  pub maximum_age:   Duration,
}

impl Default for PositionOptions {
  fn default() -> Self {
    Self { high_accuracy: true, timeout: LOCATION_TIMEOUT, maximum_age: Duration::ZERO }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
  #[error("geolocation is not supported on this device")]
  Unsupported,

  #[error("location permission denied")]
  PermissionDenied,

  #[error("position unavailable: {0}")]
  Unavailable(String),

  #[error("timed out waiting for a position fix")]
  Timeout,
}

pub trait GeolocationProvider: Send + Sync {
  fn current_position(
    &self,
    options: PositionOptions,
  ) -> impl Future<Output = Result<Location, GeolocationError>> + Send + '_;
}

/// Outcome of the location step, shown next to the camera preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationReport {
  Fix(Location),
  Unavailable,
}

impl LocationReport {
  pub fn location(&self) -> Option<Location> {
    match self {
      Self::Fix(loc) => Some(*loc),
      Self::Unavailable => None,
    }
  }

  pub fn lines(&self) -> Vec<String> {
    match self {
      Self::Fix(loc) => vec![
        "Your location was determined:".to_owned(),
        format!("Latitude: {:.6}", loc.latitude),
        format!("Longitude: {:.6}", loc.longitude),
        format!("Accuracy: ±{} m", loc.accuracy.round() as i64),
      ],
      Self::Unavailable => vec!["Could not determine precise location".to_owned()],
    }
  }
}

// ─── Camera ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
  User,
  Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConstraints {
  pub facing_mode:  FacingMode,
  pub ideal_width:  u32,
  pub ideal_height: u32,
}

impl Default for VideoConstraints {
  /// Front-facing, ideally 1280×720.
  fn default() -> Self {
    Self { facing_mode: FacingMode::User, ideal_width: 1280, ideal_height: 720 }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
  #[error("camera access denied: {0}")]
  Denied(String),

  #[error("no camera available")]
  NotFound,

  #[error("could not read a frame: {0}")]
  Frame(String),
}

/// An encoded still frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StillImage {
  pub mime:   String,
  pub width:  u32,
  pub height: u32,
  pub bytes:  Vec<u8>,
}

/// A live video stream holding the camera device.
pub trait CameraStream: Send {
  /// Native frame size of the running stream.
  fn video_size(&self) -> (u32, u32);

  /// Grab the current frame at `width`×`height` and encode it as JPEG.
  fn capture_still(
    &mut self,
    width: u32,
    height: u32,
    quality: f32,
  ) -> Result<StillImage, CameraError>;

  /// Stop every hardware track, releasing the device.
  fn stop_all_tracks(&mut self);
}

pub trait CameraProvider: Send + Sync {
  type Stream: CameraStream + 'static;

  /// Request a video stream. May wait indefinitely on a permission prompt.
  fn request_video_stream(
    &self,
    constraints: VideoConstraints,
  ) -> impl Future<Output = Result<Self::Stream, CameraError>> + Send + '_;
}

/// Owns a camera stream and stops its tracks exactly once: on
/// [`release`](Self::release) or on drop.
pub struct StreamGuard<S: CameraStream> {
  stream:   S,
  released: bool,
}

impl<S: CameraStream> StreamGuard<S> {
  pub fn new(stream: S) -> Self { Self { stream, released: false } }

  pub fn stream(&self) -> &S { &self.stream }

  pub fn stream_mut(&mut self) -> &mut S { &mut self.stream }

  pub fn release(&mut self) {
    if !self.released {
      self.stream.stop_all_tracks();
      self.released = true;
      debug!("camera tracks stopped");
    }
  }
}

impl<S: CameraStream> Drop for StreamGuard<S> {
  fn drop(&mut self) { self.release(); }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
  Idle,
  AcquiringLocation,
  AcquiringCamera,
  Ready,
  Captured,
  Cancelled,
}

#[derive(Debug, Error)]
pub enum CaptureError {
  #[error(
    "Preparation failed: Could not access the camera. Please make sure camera access is allowed."
  )]
  Camera(#[source] CameraError),

  #[error("the camera is not ready")]
  NotReady,

  #[error("Could not capture photo: {0}")]
  Frame(#[source] CameraError),
}

/// What a completed capture hands to the recorder.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOutput {
  pub location: Option<Location>,
  pub photo:    Option<Photo>,
}

pub struct CapturePipeline<G, C: CameraProvider> {
  geolocation: G,
  camera:      C,
  state:       CaptureState,
  location:    Option<Location>,
  stream:      Option<StreamGuard<C::Stream>>,
}

impl<G, C> CapturePipeline<G, C>
where
  G: GeolocationProvider,
  C: CameraProvider,
{
  pub fn new(geolocation: G, camera: C) -> Self {
    Self { geolocation, camera, state: CaptureState::Idle, location: None, stream: None }
  }

  pub fn state(&self) -> CaptureState { self.state }

  /// Whether a camera stream is currently held.
  pub fn is_streaming(&self) -> bool { self.stream.is_some() }

  /// Acquire location (best-effort) and then the camera. On success the
  /// pipeline is `Ready` and the location outcome is returned for display.
  pub async fn prepare(&mut self) -> Result<LocationReport, CaptureError> {
    self.stream = None;
    self.location = None;

    self.state = CaptureState::AcquiringLocation;
    let report = self.acquire_location().await;
    self.location = report.location();

    self.state = CaptureState::AcquiringCamera;
    debug!("requesting camera stream");
    match self.camera.request_video_stream(VideoConstraints::default()).await {
      Ok(stream) => {
        self.stream = Some(StreamGuard::new(stream));
        self.state = CaptureState::Ready;
        Ok(report)
      }
      Err(e) => {
        warn!(error = %e, "camera unavailable; aborting capture");
        self.location = None;
        self.state = CaptureState::Idle;
        Err(CaptureError::Camera(e))
      }
    }
  }

  async fn acquire_location(&self) -> LocationReport {
    let options = PositionOptions::default();
    let request = self.geolocation.current_position(options);
    match tokio::time::timeout(options.timeout, request).await {
      Ok(Ok(location)) => {
        info!(accuracy = location.accuracy, "location acquired");
        LocationReport::Fix(location)
      }
      Ok(Err(e)) => {
        warn!(error = %e, "location unavailable; continuing without it");
        LocationReport::Unavailable
      }
      Err(_) => {
        warn!(error = %GeolocationError::Timeout, "location unavailable; continuing without it");
        LocationReport::Unavailable
      }
    }
  }

  /// Take the photo at the stream's native size and release the camera.
  pub fn capture(&mut self) -> Result<CaptureOutput, CaptureError> {
    if self.state != CaptureState::Ready {
      return Err(CaptureError::NotReady);
    }
    let mut guard = self.stream.take().ok_or(CaptureError::NotReady)?;
    let (width, height) = guard.stream().video_size();
    let still = guard.stream_mut().capture_still(width, height, PHOTO_QUALITY);
    guard.release();

    match still {
      Ok(still) => {
        self.state = CaptureState::Captured;
        Ok(CaptureOutput {
          location: self.location.take(),
          photo:    Some(Photo::from_encoded(&still.mime, &still.bytes)),
        })
      }
      Err(e) => {
        self.location = None;
        self.state = CaptureState::Idle;
        Err(CaptureError::Frame(e))
      }
    }
  }

  /// Close the capture view: release the camera without submitting.
  pub fn cancel(&mut self) {
    let had_stream = self.stream.take().is_some();
    self.location = None;
    if had_stream || self.state == CaptureState::Ready {
      self.state = CaptureState::Cancelled;
    }
  }
}
