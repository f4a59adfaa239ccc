//! Handlers for `/messages` endpoints (admin only).
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/messages` | Newest first |
//! | `GET`    | `/messages/:id` | 404 if not found |
//! | `POST`   | `/messages/:id/toggle-read` | Flips `isRead`; returns the updated row |
//! | `DELETE` | `/messages/:id` | 202 + `{id, redirect}` |

use atelier_core::{
  client::StoreClient,
  entity::ContactMessage,
  record::Stored,
  store::DocumentStore,
};
use axum::{
  Json,
  extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRow {
  #[serde(flatten)]
  pub message:  Stored<ContactMessage>,
  /// `createdAt` formatted for display, e.g. `May 1, 2024, 10:00`.
  pub received: String,
}

impl From<Stored<ContactMessage>> for MessageRow {
  fn from(message: Stored<ContactMessage>) -> Self {
    Self { received: display_time(message.created_at), message }
  }
}

pub fn display_time(at: DateTime<Utc>) -> String { at.format("%b %-d, %Y, %H:%M").to_string() }

fn not_found() -> ApiError { ApiError::NotFound("Message not found".to_string()) }

/// `GET /messages`
pub async fn list<S>(State(client): State<StoreClient<S>>) -> Result<Json<Vec<MessageRow>>, ApiError>
where
  S: DocumentStore + 'static,
{
  let messages = client.list::<ContactMessage>().await?;
  Ok(Json(messages.into_iter().map(MessageRow::from).collect()))
}

/// `GET /messages/:id`
pub async fn get_one<S>(
  State(client): State<StoreClient<S>>,
  Path(id): Path<String>,
) -> Result<Json<MessageRow>, ApiError>
where
  S: DocumentStore + 'static,
{
  let message = client.get::<ContactMessage>(&id).await?.ok_or_else(not_found)?;
  Ok(Json(message.into()))
}

/// `POST /messages/:id/toggle-read`
pub async fn toggle_read<S>(
  State(client): State<StoreClient<S>>,
  Path(id): Path<String>,
) -> Result<Json<MessageRow>, ApiError>
where
  S: DocumentStore + 'static,
{
  let current = client.get::<ContactMessage>(&id).await?.ok_or_else(not_found)?;
  let toggled = ContactMessage { is_read: !current.data.is_read, ..current.data };
  let updated = client.update(&id, toggled).await?.ok_or_else(not_found)?;
  tracing::debug!(%id, is_read = updated.data.is_read, "message read state toggled");
  Ok(Json(updated.into()))
}
