//! Model-assisted copy drafting for the project editor.

use std::sync::Arc;

use atelier_core::{
  copywriting::{self, CaptionRequest, Captions, CaseStudy, CaseStudyRequest, GenerationError},
  store::DocumentStore,
};
use axum::{Json, extract::State};

use crate::{AppState, ai::HostedModel, error::Error};

/// Check the site's AI switch and pick the model: the request's override,
/// then the site setting, then the server default.
async fn resolve<S>(
  state: &AppState<S>,
  requested: Option<&str>,
) -> Result<(Arc<HostedModel>, String), Error>
where
  S: DocumentStore + 'static,
{
  let content = atelier_api::site::load(&state.client).await?;
  if !content.ai.is_enabled {
    return Err(GenerationError::Disabled.into());
  }
  let model = state.model.clone().ok_or(GenerationError::MissingApiKey)?;
  let name = requested
    .map(str::trim)
    .filter(|m| !m.is_empty())
    .or(content.ai.model())
    .unwrap_or(model.default_model())
    .to_string();
  Ok((model, name))
}

/// `POST /api/admin/generate/case-study`
pub async fn case_study<S>(
  State(state): State<AppState<S>>,
  Json(req): Json<CaseStudyRequest>,
) -> Result<Json<CaseStudy>, Error>
where
  S: DocumentStore + 'static,
{
  let (model, name) = resolve(&state, req.model.as_deref()).await?;
  tracing::info!(model = %name, title = %req.title, "drafting case study");
  Ok(Json(copywriting::case_study(model.as_ref(), &name, &req).await?))
}

/// `POST /api/admin/generate/captions`
pub async fn captions<S>(
  State(state): State<AppState<S>>,
  Json(req): Json<CaptionRequest>,
) -> Result<Json<Captions>, Error>
where
  S: DocumentStore + 'static,
{
  let (model, name) = resolve(&state, req.model.as_deref()).await?;
  tracing::info!(model = %name, title = %req.project_title, "drafting captions");
  Ok(Json(copywriting::captions(model.as_ref(), &name, &req).await?))
}
