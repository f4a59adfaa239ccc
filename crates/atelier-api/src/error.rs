//! API error type and [`axum::response::IntoResponse`] implementation.

use atelier_core::form::FieldErrors;
use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// Per-field messages; rendered as `{"errors": {field: message}}`.
  #[error("validation failed on {} field(s)", .0.len())]
  Validation(FieldErrors),

  #[error("permission denied: {0}")]
  PermissionDenied(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<atelier_core::Error> for ApiError {
  fn from(e: atelier_core::Error) -> Self {
    use atelier_core::Error as E;
    match e {
      E::Validation(errors) => Self::Validation(errors),
      E::PermissionDenied { path, operation } => {
        Self::PermissionDenied(format!("{operation} on {path}"))
      }
      E::NotFound(what) => Self::NotFound(what),
      other => Self::Store(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Validation(errors) => {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "errors": errors })))
          .into_response();
      }
      ApiError::PermissionDenied(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store error");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
