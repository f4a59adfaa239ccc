//! Model-assisted copy generation for projects.
//!
//! Two flows, each a fixed prompt template and a strict JSON answer:
//! [`case_study`] drafts the problem/solution/outcome prose of a project and
//! [`captions`] drafts three captions of different lengths. There is no
//! retry, streaming or caching. An answer missing any field is an error.

use std::future::Future;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
  #[error("the model returned no output")]
  NoOutput,

  #[error("the model output could not be read: {0}")]
  Malformed(String),

  #[error("the model output is missing `{0}`")]
  EmptyField(&'static str),

  #[error("the model service answered {status}: {body}")]
  Upstream { status: u16, body: String },

  #[error("could not reach the model service: {0}")]
  Transport(String),

  #[error("no API key is configured for the model service")]
  MissingApiKey,

  #[error("copy generation is disabled")]
  Disabled,
}

// ─── Model abstraction ───────────────────────────────────────────────────────

/// A hosted text model. `Ok(None)` means the call succeeded but produced no
/// text.
pub trait TextModel: Send + Sync {
  fn generate(
    &self,
    model: &str,
    prompt: String,
  ) -> impl Future<Output = Result<Option<String>, GenerationError>> + Send;
}

// ─── Case study ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaseStudyRequest {
  pub title:       String,
  pub description: String,
  /// Overrides the configured model for this call.
  pub model:       Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseStudy {
  pub problem:  String,
  pub solution: String,
  pub outcome:  String,
}

pub fn case_study_prompt(req: &CaseStudyRequest) -> String {
  format!(
    "You are a senior copywriter at a design studio. Write a short case study \
     for the project below.\n\n\
     Project title: {title}\n\
     Project description: {description}\n\n\
     Respond with a single JSON object and nothing else, using exactly these \
     keys: \"problem\" (the client's challenge), \"solution\" (what the studio \
     designed) and \"outcome\" (the result). Each value is one to two \
     paragraphs of plain text in a professional, confident tone.",
    title = req.title.trim(),
    description = req.description.trim(),
  )
}

pub async fn case_study<M: TextModel>(
  model: &M,
  model_name: &str,
  req: &CaseStudyRequest,
) -> Result<CaseStudy, GenerationError> {
  #[derive(Deserialize, Default)]
  #[serde(default)]
  struct Raw {
    problem:  String,
    solution: String,
    outcome:  String,
  }

  let raw: Raw = ask(model, model_name, case_study_prompt(req)).await?;
  Ok(CaseStudy {
    problem:  non_empty("problem", raw.problem)?,
    solution: non_empty("solution", raw.solution)?,
    outcome:  non_empty("outcome", raw.outcome)?,
  })
}

// ─── Captions ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptionRequest {
  pub project_title: String,
  pub category:      String,
  pub tools:         String,
  pub model:         Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Captions {
  pub short_caption:        String,
  pub long_case_study:      String,
  pub social_media_version: String,
}

pub fn caption_prompt(req: &CaptionRequest) -> String {
  format!(
    "You write portfolio copy for a design studio.\n\n\
     Project: {title}\n\
     Category: {category}\n\
     Tools used: {tools}\n\n\
     Respond with a single JSON object and nothing else, using exactly these \
     keys: \"shortCaption\" (one sentence), \"longCaseStudy\" (two or three \
     paragraphs) and \"socialMediaVersion\" (a short post with a few \
     hashtags).",
    title = req.project_title.trim(),
    category = req.category.trim(),
    tools = req.tools.trim(),
  )
}

pub async fn captions<M: TextModel>(
  model: &M,
  model_name: &str,
  req: &CaptionRequest,
) -> Result<Captions, GenerationError> {
  #[derive(Deserialize, Default)]
  #[serde(rename_all = "camelCase", default)]
  struct Raw {
    short_caption:        String,
    long_case_study:      String,
    social_media_version: String,
  }

  let raw: Raw = ask(model, model_name, caption_prompt(req)).await?;
  Ok(Captions {
    short_caption:        non_empty("shortCaption", raw.short_caption)?,
    long_case_study:      non_empty("longCaseStudy", raw.long_case_study)?,
    social_media_version: non_empty("socialMediaVersion", raw.social_media_version)?,
  })
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

async fn ask<M: TextModel, T: DeserializeOwned>(
  model: &M,
  model_name: &str,
  prompt: String,
) -> Result<T, GenerationError> {
  let text = model
    .generate(model_name, prompt)
    .await?
    .filter(|t| !t.trim().is_empty())
    .ok_or(GenerationError::NoOutput)?;
  parse_json(&text)
}

/// Parse the first JSON object in `text`, tolerating Markdown code fences and
/// surrounding prose.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, GenerationError> {
  let start = text.find('{');
  let end = text.rfind('}');
  let body = match (start, end) {
    (Some(s), Some(e)) if s < e => &text[s..=e],
    _ => return Err(GenerationError::Malformed("no JSON object in output".into())),
  };
  serde_json::from_str(body).map_err(|e| GenerationError::Malformed(e.to_string()))
}

fn non_empty(field: &'static str, value: String) -> Result<String, GenerationError> {
  let value = value.trim().to_string();
  if value.is_empty() { Err(GenerationError::EmptyField(field)) } else { Ok(value) }
}
