//! The error bus, as a log and as a toast feed for the admin console.

use atelier_core::{
  events::{ErrorBus, ErrorEvent},
  store::DocumentStore,
};
use axum::{
  extract::State,
  response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, stream};
use tokio::{
  sync::broadcast::{Receiver, error::RecvError},
  task::JoinHandle,
};

use crate::AppState;

async fn next_event(rx: &mut Receiver<ErrorEvent>) -> Option<ErrorEvent> {
  loop {
    match rx.recv().await {
      Ok(event) => return Some(event),
      Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "error feed lagged"),
      Err(RecvError::Closed) => return None,
    }
  }
}

/// Log every published error event until the bus closes.
pub fn spawn_error_log(bus: &ErrorBus) -> JoinHandle<()> {
  let mut rx = bus.subscribe();
  tokio::spawn(async move {
    while let Some(event) = next_event(&mut rx).await {
      tracing::error!(
        path = %event.path,
        operation = %event.operation,
        permission = event.permission,
        payload = ?event.request_payload,
        "{}",
        event.message
      );
    }
  })
}

/// `GET /api/admin/events`
pub async fn toasts<S>(
  State(state): State<AppState<S>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>>
where
  S: DocumentStore + 'static,
{
  let events = stream::unfold(state.bus.subscribe(), |mut rx| async move {
    let event = next_event(&mut rx).await?;
    Some((Event::default().event("toast").json_data(event.toast()), rx))
  });
  Sse::new(events).keep_alive(KeepAlive::default())
}
