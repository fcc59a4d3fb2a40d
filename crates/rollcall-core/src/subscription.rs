//! Live snapshot subscriptions.
//!
//! A subscription does not carry diffs: every change to the underlying
//! collection produces the full current [`Snapshot`]. Pushes that arrive
//! faster than the consumer reads them coalesce, and the consumer only ever
//! sees the latest one.

use std::{fmt, future::Future};

use tokio::{
  sync::{broadcast, watch},
  task::JoinHandle,
};
use tracing::{debug, warn};

use crate::store::{Collection, Snapshot};

/// Create a connected publisher/subscription pair.
pub fn channel<T>() -> (Publisher<T>, Subscription<T>) {
  let (tx, rx) = watch::channel(None);
  (Publisher { tx }, Subscription { rx })
}

/// Store-side half: pushes snapshots to one subscriber.
pub struct Publisher<T> {
  tx: watch::Sender<Option<Snapshot<T>>>,
}

impl<T> Publisher<T> {
  /// Deliver a fresh snapshot. Returns `false` once the subscriber is gone.
  pub fn publish(&self, snapshot: Snapshot<T>) -> bool { self.tx.send(Some(snapshot)).is_ok() }

  pub fn is_closed(&self) -> bool { self.tx.is_closed() }

  /// Resolves when the subscriber has been dropped.
  pub async fn closed(&self) { self.tx.closed().await }
}

/// Consumer-side half. Dropping it ends the store's publishing task.
pub struct Subscription<T> {
  rx: watch::Receiver<Option<Snapshot<T>>>,
}

impl<T: Clone> Subscription<T> {
  /// Wait for the next snapshot. `None` once the store stops publishing.
  pub async fn next(&mut self) -> Option<Snapshot<T>> {
    loop {
      self.rx.changed().await.ok()?;
      if let Some(snapshot) = self.rx.borrow_and_update().clone() {
        return Some(snapshot);
      }
    }
  }
}

/// Drive a subscription from a store's change feed.
///
/// Publishes `load()` immediately, then again after every change to
/// `collection`. Stops when the subscriber is dropped or the feed closes. A
/// failed read is logged and skipped; the next change retries it. `changes`
/// must be subscribed before calling so no change slips past the first read.
pub fn spawn_feed<T, E, F, Fut>(
  collection:  Collection,
  mut changes: broadcast::Receiver<Collection>,
  publisher:   Publisher<T>,
  mut load:    F,
) -> JoinHandle<()>
where
  T: Send + Sync + 'static,
  E: fmt::Display + Send + 'static,
  F: FnMut() -> Fut + Send + 'static,
  Fut: Future<Output = Result<Snapshot<T>, E>> + Send,
{
  tokio::spawn(async move {
    loop {
      match load().await {
        Ok(snapshot) => {
          debug!(%collection, entries = snapshot.len(), "pushing snapshot");
          if !publisher.publish(snapshot) {
            return;
          }
        }
        Err(e) => warn!(%collection, error = %e, "snapshot read failed"),
      }

      loop {
        tokio::select! {
          _ = publisher.closed() => return,
          change = changes.recv() => match change {
            Ok(c) if c == collection => break,
            Ok(_) => {}
            // Missed notifications: reload to be safe.
            Err(broadcast::error::RecvError::Lagged(_)) => break,
            Err(broadcast::error::RecvError::Closed) => return,
          },
        }
      }
    }
  })
}
