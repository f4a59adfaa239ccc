//! Image uploads, either signed for the browser or proxied through us.

use atelier_core::store::DocumentStore;
use axum::{
  Json,
  extract::{Multipart, State, multipart::MultipartError},
  http::StatusCode,
};
use chrono::Utc;
use serde::Serialize;

use crate::{
  AppState,
  error::Error,
  image_host::{self, ImageHost, UploadSignature},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Uploaded {
  pub secure_url: String,
}

fn host<S>(state: &AppState<S>) -> Result<&ImageHost, Error> {
  state
    .image_host
    .as_deref()
    .ok_or_else(|| Error::Unavailable("Image uploads are not configured on this server.".into()))
}

fn multipart_error(e: MultipartError) -> Error {
  if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
    Error::PayloadTooLarge("Images must be 5 MB or smaller.".into())
  } else {
    Error::BadRequest(e.body_text())
  }
}

/// `POST /api/admin/uploads/signature`
pub async fn signature<S>(State(state): State<AppState<S>>) -> Result<Json<UploadSignature>, Error>
where
  S: DocumentStore + 'static,
{
  Ok(Json(host(&state)?.signature(Utc::now().timestamp())))
}

/// `POST /api/admin/uploads` with a single multipart file field.
pub async fn upload<S>(
  State(state): State<AppState<S>>,
  mut multipart: Multipart,
) -> Result<Json<Uploaded>, Error>
where
  S: DocumentStore + 'static,
{
  let host = host(&state)?;
  let field = multipart
    .next_field()
    .await
    .map_err(multipart_error)?
    .ok_or_else(|| Error::BadRequest("No file provided.".into()))?;
  let filename = field.file_name().unwrap_or_default().to_string();
  let bytes = field.bytes().await.map_err(multipart_error)?;

  let image = image_host::validate(&filename, bytes.to_vec())?;
  let size = image.bytes.len();
  let secure_url = host.upload(image, Utc::now().timestamp()).await?;
  tracing::info!(%filename, size, %secure_url, "image uploaded");
  Ok(Json(Uploaded { secure_url }))
}
