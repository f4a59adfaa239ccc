//! Server-sent snapshot feeds for client-rendered consumers.
//!
//! Each connection owns one [`Subscription`] read with public access. The
//! first event carries `loading: true` unless the read already finished; a
//! failed read sends one error snapshot and closes the stream.

use atelier_api::ApiError;
use atelier_core::{
  entity::{
    ContactMessage, GalleryCategory, GalleryImage, Project, ProjectCategory, Testimonial,
  },
  live::Subscription,
  record::{Collection, Record},
  rules::Access,
  site::{SITE_CONTENT_ID, SiteContent},
  store::DocumentStore,
};
use axum::{
  extract::{Path, State},
  response::sse::{Event, KeepAlive, KeepAliveStream, Sse},
};
use futures::stream::{self, BoxStream, StreamExt as _};
use serde::Serialize;

use crate::{AppState, error::Error};

pub type SnapshotStream = Sse<KeepAliveStream<BoxStream<'static, Result<Event, axum::Error>>>>;

fn snapshots<D>(subscription: Subscription<D>) -> SnapshotStream
where
  D: Serialize + Clone + Send + Sync + 'static,
{
  let events = stream::unfold(subscription, |mut sub| async move {
    let snapshot = sub.next().await?;
    Some((Event::default().event("snapshot").json_data(&snapshot), sub))
  });
  Sse::new(events.boxed()).keep_alive(KeepAlive::default())
}

fn query<S, T>(state: &AppState<S>) -> SnapshotStream
where
  S: DocumentStore + 'static,
  T: Record,
{
  snapshots(state.client.with_access(Access::Public).watch_query::<T>(Some(T::DEFAULT_SORT)))
}

fn site_document<S>(state: &AppState<S>) -> SnapshotStream
where
  S: DocumentStore + 'static,
{
  let client = state.client.with_access(Access::Public);
  snapshots(client.watch_doc::<SiteContent>(Some(SITE_CONTENT_ID.to_string())))
}

/// `GET /api/live/site-content`
pub async fn site_content<S>(State(state): State<AppState<S>>) -> SnapshotStream
where
  S: DocumentStore + 'static,
{
  site_document(&state)
}

/// `GET /api/live/{collection}` where `collection` is a wire name such as
/// `projects` or `galleryImages`.
pub async fn collection<S>(
  State(state): State<AppState<S>>,
  Path(name): Path<String>,
) -> Result<SnapshotStream, Error>
where
  S: DocumentStore + 'static,
{
  let collection: Collection = name
    .parse()
    .map_err(|_| ApiError::NotFound(format!("unknown collection {name:?}")))?;
  Ok(match collection {
    Collection::Projects => query::<S, Project>(&state),
    Collection::ProjectCategories => query::<S, ProjectCategory>(&state),
    Collection::GalleryImages => query::<S, GalleryImage>(&state),
    Collection::GalleryCategories => query::<S, GalleryCategory>(&state),
    Collection::Testimonials => query::<S, Testimonial>(&state),
    Collection::ContactMessages => query::<S, ContactMessage>(&state),
    Collection::SiteContent => site_document(&state),
  })
}
