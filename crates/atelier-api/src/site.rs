//! Handlers for the singleton site content document and the views derived
//! from it.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/site-content` | Defaults when the document does not exist yet |
//! | `PUT`  | `/site-content` | Validated; upserts `siteContent/global` (admin) |
//! | `GET`  | `/layout` | Which home page sections are shown |
//! | `GET`  | `/dashboard` | Collection counts (admin) |

use atelier_core::{
  client::StoreClient,
  content::{self, HomePage},
  dashboard::{self, Dashboard},
  form::Form,
  site::{SITE_CONTENT_ID, SiteContent},
  store::DocumentStore,
};
use axum::{
  Json,
  extract::State,
  http::StatusCode,
};

use crate::{
  crud::{Accepted, accepted},
  error::ApiError,
};

/// Read site content, falling back to defaults when it has never been saved.
pub async fn load<S>(client: &StoreClient<S>) -> Result<SiteContent, ApiError>
where
  S: DocumentStore + 'static,
{
  let stored = client.get::<SiteContent>(SITE_CONTENT_ID).await?;
  Ok(stored.map(|s| s.data).unwrap_or_default())
}

/// `GET /site-content`
pub async fn get_content<S>(
  State(client): State<StoreClient<S>>,
) -> Result<Json<SiteContent>, ApiError>
where
  S: DocumentStore + 'static,
{
  Ok(Json(load(&client).await?))
}

/// `PUT /site-content`
pub async fn put_content<S>(
  State(client): State<StoreClient<S>>,
  Json(form): Json<SiteContent>,
) -> Result<(StatusCode, Json<Accepted>), ApiError>
where
  S: DocumentStore + 'static,
{
  let content = form.validate().map_err(ApiError::Validation)?;
  Ok(accepted::<SiteContent>(client.submit(Some(SITE_CONTENT_ID.to_string()), content)))
}

/// `GET /layout`
pub async fn layout<S>(State(client): State<StoreClient<S>>) -> Result<Json<HomePage>, ApiError>
where
  S: DocumentStore + 'static,
{
  Ok(Json(content::compose(&load(&client).await?)))
}

/// `GET /dashboard`
pub async fn dashboard<S>(
  State(client): State<StoreClient<S>>,
) -> Result<Json<Dashboard>, ApiError>
where
  S: DocumentStore + 'static,
{
  Ok(Json(dashboard::load(&client).await?))
}
