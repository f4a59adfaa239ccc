//! Live subscriptions over the store's change feed.
//!
//! A [`Subscription`] owns a background task that re-reads its document or
//! query whenever the store reports a change to the watched collection, and
//! publishes each result as a [`Snapshot`]. Dropping the subscription stops
//! the task.

use std::future::Future;

use serde::Serialize;
use tokio::{
  sync::{
    broadcast::{self, error::RecvError},
    watch,
  },
  task::JoinHandle,
};

use crate::{Result, store::Change};

/// The state of a live read as seen by a consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot<D> {
  pub data:    Option<D>,
  /// True until the first read completes.
  pub loading: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error:   Option<String>,
}

impl<D> Snapshot<D> {
  pub fn loading() -> Self { Self { data: None, loading: true, error: None } }

  /// No reference to watch yet.
  pub fn idle() -> Self { Self { data: None, loading: false, error: None } }

  pub fn ready(data: Option<D>) -> Self { Self { data, loading: false, error: None } }

  pub fn failed(message: String) -> Self {
    Self { data: None, loading: false, error: Some(message) }
  }
}

/// A stream of [`Snapshot`]s. Intermediate snapshots may be skipped when the
/// consumer is slower than the feed; the latest one is always observed.
#[derive(Debug)]
pub struct Subscription<D> {
  rx:        watch::Receiver<Snapshot<D>>,
  task:      Option<JoinHandle<()>>,
  delivered: bool,
}

impl<D: Clone + Send + Sync + 'static> Subscription<D> {
  /// A subscription that never opens a listener.
  pub fn inert() -> Self {
    let (_, rx) = watch::channel(Snapshot::idle());
    Self { rx, task: None, delivered: false }
  }

  /// Start watching. `fetch` is called once up front and again after every
  /// change accepted by `matches`. A failed read publishes an error snapshot
  /// and ends the subscription.
  pub(crate) fn spawn<M, F, Fut>(
    mut changes: broadcast::Receiver<Change>,
    matches: M,
    fetch: F,
  ) -> Self
  where
    M: Fn(&Change) -> bool + Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Option<D>>> + Send,
  {
    let (tx, rx) = watch::channel(Snapshot::loading());
    let task = tokio::spawn(async move {
      loop {
        match fetch().await {
          Ok(data) => {
            if tx.send(Snapshot::ready(data)).is_err() {
              return;
            }
          }
          Err(e) => {
            let _ = tx.send(Snapshot::failed(e.to_string()));
            return;
          }
        }
        loop {
          match changes.recv().await {
            Ok(change) if matches(&change) => break,
            Ok(_) => {}
            Err(RecvError::Lagged(_)) => break,
            Err(RecvError::Closed) => return,
          }
        }
      }
    });
    Self { rx, task: Some(task), delivered: false }
  }

  /// The most recent snapshot.
  pub fn current(&self) -> Snapshot<D> { self.rx.borrow().clone() }

  /// The next snapshot. The first call yields the current state immediately;
  /// later calls wait for a change. Returns `None` once the listener has
  /// ended and its last snapshot was delivered.
  pub async fn next(&mut self) -> Option<Snapshot<D>> {
    if !self.delivered {
      self.delivered = true;
      return Some(self.rx.borrow_and_update().clone());
    }
    self.rx.changed().await.ok()?;
    Some(self.rx.borrow_and_update().clone())
  }

  /// Whether the background listener is still running.
  pub fn is_listening(&self) -> bool { self.task.as_ref().is_some_and(|t| !t.is_finished()) }
}

impl<D> Drop for Subscription<D> {
  fn drop(&mut self) {
    if let Some(task) = self.task.take() {
      task.abort();
    }
  }
}
