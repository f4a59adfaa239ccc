//! Demo data fill and reset. Both are destructive enough to require the
//! admin password again, checked fresh on every call.

use atelier_core::{
  demo::{self, FillSummary, ResetSummary},
  store::DocumentStore,
};
use axum::{Json, extract::State};
use serde::Deserialize;

use crate::{AppState, auth::Authenticated, error::Error};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Reauthenticate {
  pub password: String,
}

fn reauthenticate<S>(state: &AppState<S>, user: &Authenticated, password: &str) -> Result<(), Error> {
  if state.auth.verify_password(password) {
    return Ok(());
  }
  tracing::warn!(email = %user.email, "re-authentication failed");
  Err(Error::IncorrectPassword)
}

/// `POST /api/admin/demo/fill`
pub async fn fill<S>(
  State(state): State<AppState<S>>,
  user: Authenticated,
  Json(req): Json<Reauthenticate>,
) -> Result<Json<FillSummary>, Error>
where
  S: DocumentStore + 'static,
{
  reauthenticate(&state, &user, &req.password)?;
  let summary = demo::fill(&state.client).await?;
  tracing::info!(
    email = %user.email,
    categories = summary.categories,
    projects = summary.projects,
    "demo data filled"
  );
  Ok(Json(summary))
}

/// `POST /api/admin/demo/reset`
pub async fn reset<S>(
  State(state): State<AppState<S>>,
  user: Authenticated,
  Json(req): Json<Reauthenticate>,
) -> Result<Json<ResetSummary>, Error>
where
  S: DocumentStore + 'static,
{
  reauthenticate(&state, &user, &req.password)?;
  let summary = demo::reset(&state.client).await?;
  tracing::info!(email = %user.email, deleted = summary.deleted, "demo data reset");
  Ok(Json(summary))
}
