//! The public contact form.
//!
//! `POST /api/contact` writes with public access, which the access rules
//! allow for contact messages only. `POST /api/contact/fallback` is the
//! server-side path the form falls back to: it writes with admin access and,
//! when SMTP is configured, emails the studio. A failed email never undoes
//! the stored message.

use atelier_core::{
  form::{ContactForm, Form},
  rules::Access,
  store::DocumentStore,
};
use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::{AppState, error::Error, handlers::invalid};

#[derive(Debug, Serialize)]
pub struct Receipt {
  pub id:       String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notified: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub warning:  Option<String>,
}

/// `POST /api/contact`
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  Json(form): Json<ContactForm>,
) -> Result<(StatusCode, Json<Receipt>), Error>
where
  S: DocumentStore + 'static,
{
  let message = form.validate().map_err(invalid)?;
  let stored = state.client.with_access(Access::Public).save(None, message).await?;
  tracing::info!(id = %stored.id, "contact message received");
  Ok((StatusCode::CREATED, Json(Receipt { id: stored.id, notified: None, warning: None })))
}

/// `POST /api/contact/fallback`
pub async fn fallback<S>(
  State(state): State<AppState<S>>,
  Json(form): Json<ContactForm>,
) -> Result<(StatusCode, Json<Receipt>), Error>
where
  S: DocumentStore + 'static,
{
  let message = form.validate().map_err(invalid)?;
  let stored = state.client.save(None, message).await?;
  tracing::info!(id = %stored.id, "contact message received via fallback");

  let (notified, warning) = match &state.mailer {
    None => (false, None),
    Some(mailer) => match mailer.notify_contact(&stored).await {
      Ok(()) => (true, None),
      Err(e) => {
        tracing::warn!(id = %stored.id, error = %e, "contact notification failed");
        (false, Some("Your message was saved, but the studio could not be emailed.".to_string()))
      }
    },
  };
  Ok((
    StatusCode::CREATED,
    Json(Receipt { id: stored.id, notified: Some(notified), warning }),
  ))
}
