//! Error types and axum `IntoResponse` implementation.

use atelier_api::ApiError;
use atelier_core::copywriting::GenerationError;
use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// No valid session or credentials on an admin route.
  #[error("unauthorized")]
  Unauthorized,
  #[error("Invalid email or password.")]
  InvalidCredentials,
  /// Re-authentication for a destructive action failed.
  #[error("Incorrect password.")]
  IncorrectPassword,
  #[error("bad request: {0}")]
  BadRequest(String),
  #[error("{0}")]
  PayloadTooLarge(String),
  /// A collaborator is not configured.
  #[error("{0}")]
  Unavailable(String),
  /// A collaborator answered with an error.
  #[error("{0}")]
  Upstream(String),
  /// A collaborator could not be set up from configuration.
  #[error("configuration: {0}")]
  Config(String),
  #[error(transparent)]
  Generation(#[from] GenerationError),
  #[error(transparent)]
  Api(#[from] ApiError),
}

impl From<atelier_core::Error> for Error {
  fn from(e: atelier_core::Error) -> Self { Self::Api(e.into()) }
}

fn body(status: StatusCode, message: impl Into<String>) -> Response {
  (status, Json(json!({ "error": message.into() }))).into_response()
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => {
        let mut res = body(StatusCode::UNAUTHORIZED, "unauthorized");
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"atelier\""),
        );
        res
      }
      Error::InvalidCredentials => body(StatusCode::UNAUTHORIZED, self.to_string()),
      Error::IncorrectPassword => (
        StatusCode::FORBIDDEN,
        Json(json!({ "errors": { "password": self.to_string() } })),
      )
        .into_response(),
      Error::BadRequest(msg) => body(StatusCode::BAD_REQUEST, msg),
      Error::PayloadTooLarge(msg) => body(StatusCode::PAYLOAD_TOO_LARGE, msg),
      Error::Unavailable(msg) => body(StatusCode::SERVICE_UNAVAILABLE, msg),
      Error::Upstream(msg) => {
        tracing::warn!(error = %msg, "collaborator failed");
        body(StatusCode::BAD_GATEWAY, msg)
      }
      Error::Config(msg) => body(StatusCode::INTERNAL_SERVER_ERROR, msg),
      Error::Generation(e) => {
        let status = match e {
          GenerationError::Disabled => StatusCode::FORBIDDEN,
          GenerationError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
          _ => {
            tracing::warn!(error = %e, "copy generation failed");
            StatusCode::BAD_GATEWAY
          }
        };
        body(status, e.to_string())
      }
      Error::Api(e) => e.into_response(),
    }
  }
}
