//! Transient banners.
//!
//! A banner stays up for [`BANNER_VISIBLE`], plays a [`BANNER_EXIT`]
//! transition, then disappears. It cannot be dismissed early. Concurrent
//! banners stack; identical messages are not merged.

use std::{
  sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
  },
  time::Duration,
};

use serde::Serialize;

use crate::surface::Surface;

pub const BANNER_VISIBLE: Duration = Duration::from_secs(3);
pub const BANNER_EXIT: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
  Success,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
  pub id:      u64,
  pub kind:    NoticeKind,
  pub message: String,
}

pub struct Notifier<U> {
  surface: Arc<U>,
  next_id: AtomicU64,
}

impl<U: Surface> Notifier<U> {
  pub fn new(surface: Arc<U>) -> Self { Self { surface, next_id: AtomicU64::new(1) } }

  /// Show a banner and schedule its removal. Must run inside a tokio runtime.
  pub fn notify(&self, message: impl Into<String>, kind: NoticeKind) -> u64 {
    let banner = Banner {
      id: self.next_id.fetch_add(1, Ordering::Relaxed),
      kind,
      message: message.into(),
    };
    self.surface.show_banner(&banner);

    let surface = self.surface.clone();
    let id = banner.id;
    tokio::spawn(async move {
      tokio::time::sleep(BANNER_VISIBLE).await;
      surface.retire_banner(id);
      tokio::time::sleep(BANNER_EXIT).await;
      surface.remove_banner(id);
    });
    id
  }

  pub fn success(&self, message: impl Into<String>) -> u64 {
    self.notify(message, NoticeKind::Success)
  }

  pub fn error(&self, message: impl Into<String>) -> u64 { self.notify(message, NoticeKind::Error) }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{Event, RecordingSurface, settle};

  #[tokio::test(start_paused = true)]
  async fn banner_lifecycle() {
    let surface = Arc::new(RecordingSurface::default());
    let notifier = Notifier::new(surface.clone());

    let id = notifier.success("Saved");
    settle().await;
    assert_eq!(surface.events(), vec![Event::Banner(Banner {
      id,
      kind: NoticeKind::Success,
      message: "Saved".into(),
    })]);

    tokio::time::advance(BANNER_VISIBLE - Duration::from_millis(1)).await;
    settle().await;
    assert_eq!(surface.events().len(), 1);

    tokio::time::advance(Duration::from_millis(1)).await;
    settle().await;
    assert_eq!(surface.events().last(), Some(&Event::RetireBanner(id)));

    tokio::time::advance(BANNER_EXIT).await;
    settle().await;
    assert_eq!(surface.events().last(), Some(&Event::RemoveBanner(id)));
  }

  #[tokio::test(start_paused = true)]
  async fn duplicate_banners_stack() {
    let surface = Arc::new(RecordingSurface::default());
    let notifier = Notifier::new(surface.clone());

    let a = notifier.error("Incorrect PIN");
    let b = notifier.error("Incorrect PIN");
    assert_ne!(a, b);
    assert_eq!(surface.banners().len(), 2);
  }
}
