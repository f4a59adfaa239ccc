//! Error types for `atelier-core`.

use thiserror::Error;

use crate::{form::FieldErrors, rules::Operation};

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation failed on {} field(s)", .0.len())]
  Validation(FieldErrors),

  #[error("permission denied: {operation} on {path}")]
  PermissionDenied { path: String, operation: Operation },

  #[error("document not found: {0}")]
  NotFound(String),

  #[error("document {path} has schema version {found}, newest known is {known}")]
  UnsupportedVersion { path: String, found: u32, known: u32 },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Wrap a backend error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub fn is_permission_denied(&self) -> bool {
    matches!(self, Self::PermissionDenied { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
