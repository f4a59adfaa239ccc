//! Process-scoped error event bus.
//!
//! Every store failure observed by a [`StoreClient`](crate::client::StoreClient)
//! is published here as an [`ErrorEvent`]. The server logs each event and
//! forwards it to connected admin consoles as a [`Toast`].

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::rules::Operation;

/// Describes a failed store operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEvent {
  /// `collection` or `collection/id`.
  pub path:            String,
  pub operation:       Operation,
  /// The body of the attempted write, if any.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub request_payload: Option<Value>,
  /// Whether the failure was an access-rule rejection.
  pub permission:      bool,
  pub message:         String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
  Default,
  Destructive,
}

/// A short user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
  pub title:       String,
  pub description: String,
  pub variant:     ToastVariant,
}

impl ErrorEvent {
  pub fn toast(&self) -> Toast {
    if self.permission {
      Toast {
        title:       "Permission Denied".to_string(),
        description: format!(
          "You do not have permission to {} {}.",
          self.operation, self.path
        ),
        variant:     ToastVariant::Destructive,
      }
    } else {
      Toast {
        title:       "Something went wrong".to_string(),
        description: self.message.clone(),
        variant:     ToastVariant::Destructive,
      }
    }
  }
}

/// Receives error events. Injected into every client.
pub trait ErrorNotifier: Send + Sync {
  fn publish(&self, event: ErrorEvent);
}

/// Broadcast-backed [`ErrorNotifier`]. Events published while nobody is
/// subscribed are dropped.
#[derive(Debug, Clone)]
pub struct ErrorBus {
  tx: broadcast::Sender<ErrorEvent>,
}

impl ErrorBus {
  pub fn new(capacity: usize) -> Self {
    let (tx, _) = broadcast::channel(capacity);
    Self { tx }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<ErrorEvent> { self.tx.subscribe() }
}

impl Default for ErrorBus {
  fn default() -> Self { Self::new(64) }
}

impl ErrorNotifier for ErrorBus {
  fn publish(&self, event: ErrorEvent) {
    // No subscribers is not an error.
    let _ = self.tx.send(event);
  }
}
