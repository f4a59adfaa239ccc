//! Generic handlers shared by every editable collection.
//!
//! | Method   | Path            | Notes |
//! |----------|-----------------|-------|
//! | `GET`    | `/<entity>`     | Default order of the record type |
//! | `GET`    | `/<entity>/:id` | 404 if not found |
//! | `POST`   | `/<entity>`     | Body: the entity's form; 202 + `{id, redirect}` |
//! | `PUT`    | `/<entity>/:id` | Same, merging into the existing document |
//! | `DELETE` | `/<entity>/:id` | 202 + `{id, redirect}` |
//!
//! Writes are issued, not awaited: the response only promises that the
//! write was accepted. A write that later fails is reported on the error bus.

use atelier_core::{
  client::{PendingWrite, StoreClient},
  form::Form,
  record::{Record, Stored},
  store::DocumentStore,
};
use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use serde::Serialize;

use crate::error::ApiError;

/// Body of a `202 Accepted` write response.
#[derive(Debug, Serialize)]
pub struct Accepted {
  pub id:       String,
  /// The admin list view to return to.
  pub redirect: &'static str,
}

pub(crate) fn accepted<T: Record>(pending: PendingWrite) -> (StatusCode, Json<Accepted>) {
  tracing::debug!(collection = %T::COLLECTION, id = %pending.id, "write issued");
  (
    StatusCode::ACCEPTED,
    Json(Accepted { id: pending.id, redirect: T::COLLECTION.admin_path() }),
  )
}

// ─── Reads ───────────────────────────────────────────────────────────────────

/// `GET /<entity>`
pub async fn list<S, T>(
  State(client): State<StoreClient<S>>,
) -> Result<Json<Vec<Stored<T>>>, ApiError>
where
  S: DocumentStore + 'static,
  T: Record,
{
  Ok(Json(client.list::<T>().await?))
}

/// `GET /<entity>/:id`
pub async fn get_one<S, T>(
  State(client): State<StoreClient<S>>,
  Path(id): Path<String>,
) -> Result<Json<Stored<T>>, ApiError>
where
  S: DocumentStore + 'static,
  T: Record,
{
  client
    .get::<T>(&id)
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("{} not found", T::COLLECTION.doc_path(&id))))
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// `POST /<entity>`
pub async fn create<S, F>(
  State(client): State<StoreClient<S>>,
  Json(form): Json<F>,
) -> Result<(StatusCode, Json<Accepted>), ApiError>
where
  S: DocumentStore + 'static,
  F: Form,
{
  let record = form.validate().map_err(ApiError::Validation)?;
  Ok(accepted::<F::Record>(client.submit(None, record)))
}

/// `PUT /<entity>/:id`
pub async fn update<S, F>(
  State(client): State<StoreClient<S>>,
  Path(id): Path<String>,
  Json(form): Json<F>,
) -> Result<(StatusCode, Json<Accepted>), ApiError>
where
  S: DocumentStore + 'static,
  F: Form,
{
  let record = form.validate().map_err(ApiError::Validation)?;
  Ok(accepted::<F::Record>(client.submit(Some(id), record)))
}

/// `DELETE /<entity>/:id`
pub async fn delete<S, T>(
  State(client): State<StoreClient<S>>,
  Path(id): Path<String>,
) -> (StatusCode, Json<Accepted>)
where
  S: DocumentStore + 'static,
  T: Record,
{
  accepted::<T>(client.remove(T::COLLECTION, id))
}
