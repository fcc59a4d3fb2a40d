//! Live views: one pump task per region, feeding store snapshots through the
//! renderer into the surface.

use std::{collections::HashMap, sync::Arc};

use tokio::task::JoinHandle;
use tracing::debug;

use crate::{
  render::{self, AttendanceView, RegionId},
  role::MemberRole,
  store::RollStore,
  surface::Surface,
};

/// The set of regions currently kept live.
///
/// Attaching a region that is already live replaces its subscription. Pumps
/// are aborted on [`detach_all`](Self::detach_all) and on drop, which drops
/// their subscriptions and stops the store-side feeds.
#[derive(Default)]
pub struct LiveViews {
  pumps: HashMap<RegionId, JoinHandle<()>>,
}

impl LiveViews {
  pub fn new() -> Self { Self::default() }

  /// Keep the directory list for `role` live.
  pub async fn attach_directory<S, U>(
    &mut self,
    store: &S,
    role: MemberRole,
    surface: &Arc<U>,
  ) -> Result<(), S::Error>
  where
    S: RollStore,
    U: Surface,
  {
    let mut sub = store.subscribe_users(role).await?;
    let surface = surface.clone();
    let pump = tokio::spawn(async move {
      while let Some(snapshot) = sub.next().await {
        surface.rebuild(render::directory(role, &snapshot));
      }
    });
    self.replace(RegionId::directory(role), pump);
    Ok(())
  }

  /// Keep an attendance view live.
  pub async fn attach_attendance<S, U>(
    &mut self,
    store: &S,
    view: AttendanceView,
    surface: &Arc<U>,
  ) -> Result<(), S::Error>
  where
    S: RollStore,
    U: Surface,
  {
    let mut sub = store.subscribe_attendance(view.query()).await?;
    let surface = surface.clone();
    let pump = tokio::spawn(async move {
      while let Some(snapshot) = sub.next().await {
        surface.rebuild(view.render(&snapshot));
      }
    });
    self.replace(view.region(), pump);
    Ok(())
  }

  pub fn is_attached(&self, id: RegionId) -> bool { self.pumps.contains_key(&id) }

  pub fn detach_all(&mut self) {
    for (id, pump) in self.pumps.drain() {
      debug!(?id, "detaching live view");
      pump.abort();
    }
  }

  fn replace(&mut self, id: RegionId, pump: JoinHandle<()>) {
    debug!(?id, "attaching live view");
    if let Some(old) = self.pumps.insert(id, pump) {
      old.abort();
    }
  }
}

impl Drop for LiveViews {
  fn drop(&mut self) { self.detach_all(); }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::{
    render::RegionBody,
    testing::{Event, MemoryStore, RecordingSurface, attendance, settle},
    user::{Pin, Registration},
  };

  #[tokio::test]
  async fn directory_rebuilds_on_every_push() {
    let store = MemoryStore::new();
    let surface = Arc::new(RecordingSurface::default());
    let mut views = LiveViews::new();

    views.attach_directory(&store, MemberRole::Student, &surface).await.unwrap();
    settle().await;
    assert_eq!(
      surface.region(RegionId::Students).unwrap().body,
      RegionBody::Empty("No students registered yet")
    );

    for name in ["Sara", "Ali"] {
      let rec = Registration::new(MemberRole::Student, name)
        .with_class("5A")
        .into_record(Pin::generate(), Utc::now())
        .unwrap();
      store.push_user(rec).await.unwrap();
      settle().await;
    }

    let region = surface.region(RegionId::Students).unwrap();
    let names: Vec<_> = region.items().iter().map(|i| i.title.as_str()).collect();
    assert_eq!(names, vec!["Sara", "Ali"]);
  }

  #[tokio::test]
  async fn detached_views_stop_rebuilding() {
    let store = MemoryStore::new();
    let surface = Arc::new(RecordingSurface::default());
    let mut views = LiveViews::new();

    views.attach_attendance(&store, AttendanceView::History, &surface).await.unwrap();
    settle().await;
    assert!(views.is_attached(RegionId::StudentHistory));
    views.detach_all();
    assert!(!views.is_attached(RegionId::StudentHistory));
    surface.clear();

    store.push_attendance(attendance(MemberRole::Student, Utc::now())).await.unwrap();
    settle().await;
    assert!(surface.events().iter().all(|e| !matches!(e, Event::Rebuild(_))));
  }

  #[tokio::test]
  async fn reattach_replaces_previous_pump() {
    let store = MemoryStore::new();
    let surface = Arc::new(RecordingSurface::default());
    let mut views = LiveViews::new();

    views.attach_attendance(&store, AttendanceView::History, &surface).await.unwrap();
    views.attach_attendance(&store, AttendanceView::History, &surface).await.unwrap();
    settle().await;
    surface.clear();

    store.push_attendance(attendance(MemberRole::Student, Utc::now())).await.unwrap();
    settle().await;
    let rebuilds = surface
      .events()
      .into_iter()
      .filter(|e| matches!(e, Event::Rebuild(_)))
      .count();
    assert_eq!(rebuilds, 1);
  }
}
