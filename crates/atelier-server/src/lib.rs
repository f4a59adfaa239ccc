//! HTTP server for Atelier: the public site, the admin API and the
//! collaborators behind them.
//!
//! Exposes an axum [`Router`] backed by any [`DocumentStore`]. The JSON CRUD
//! surface comes from [`atelier_api`]; this crate adds sessions, uploads, copy
//! generation, contact mail, live feeds and the rendered pages.

pub mod ai;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod image_host;
pub mod mail;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use atelier_core::{
  client::StoreClient,
  events::ErrorBus,
  rules::Access,
  store::DocumentStore,
};
use axum::{
  Router,
  extract::DefaultBodyLimit,
  middleware,
  routing::{get, post},
};
use serde::Deserialize;
use tower_http::{
  request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
  trace::TraceLayer,
};

use ai::{AiConfig, HostedModel};
use auth::{AuthConfig, Sessions};
use handlers::{contact, demo, events, generate, live, pages, uploads};
use image_host::{ImageHost, ImageHostConfig, MAX_UPLOAD_BYTES};
use mail::{Mailer, SmtpConfig};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ATELIER__*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub base_url:            String,
  pub store_path:          PathBuf,
  pub admin_email:         String,
  pub admin_password_hash: String,
  #[serde(default)]
  pub image_host:          Option<ImageHostConfig>,
  #[serde(default)]
  pub ai:                  Option<AiConfig>,
  #[serde(default)]
  pub smtp:                Option<SmtpConfig>,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  /// Admin-level client; handlers narrow it with `with_access` as needed.
  pub client:     StoreClient<S>,
  pub bus:        ErrorBus,
  pub config:     Arc<ServerConfig>,
  pub auth:       Arc<AuthConfig>,
  pub sessions:   Sessions,
  pub model:      Option<Arc<HostedModel>>,
  pub image_host: Option<Arc<ImageHost>>,
  pub mailer:     Option<Arc<Mailer>>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      client:     self.client.clone(),
      bus:        self.bus.clone(),
      config:     self.config.clone(),
      auth:       self.auth.clone(),
      sessions:   self.sessions.clone(),
      model:      self.model.clone(),
      image_host: self.image_host.clone(),
      mailer:     self.mailer.clone(),
    }
  }
}

impl<S: DocumentStore + 'static> AppState<S> {
  /// Wire up state for `store`, creating a client for every collaborator that
  /// has a configuration section.
  pub fn new(store: Arc<S>, config: ServerConfig) -> Result<Self, Error> {
    let bus = ErrorBus::default();
    let client = StoreClient::new(store, Access::Admin, Arc::new(bus.clone()));
    let model = match &config.ai {
      Some(ai) => Some(Arc::new(HostedModel::new(ai)?)),
      None => None,
    };
    let image_host = match &config.image_host {
      Some(host) => Some(Arc::new(ImageHost::new(host.clone())?)),
      None => None,
    };
    let mailer = match &config.smtp {
      Some(smtp) => {
        Some(Arc::new(Mailer::new(smtp).map_err(|e| Error::Config(format!("smtp: {e}")))?))
      }
      None => None,
    };
    Ok(Self {
      client,
      bus,
      auth: Arc::new(AuthConfig {
        email:         config.admin_email.clone(),
        password_hash: config.admin_password_hash.clone(),
      }),
      config: Arc::new(config),
      sessions: Sessions::default(),
      model,
      image_host,
      mailer,
    })
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: DocumentStore + 'static,
{
  let admin_api = atelier_api::admin_router(state.client.clone())
    .merge(
      Router::new()
        .route("/demo/fill", post(demo::fill::<S>))
        .route("/demo/reset", post(demo::reset::<S>))
        .route("/uploads/signature", post(uploads::signature::<S>))
        .route(
          "/uploads",
          post(uploads::upload::<S>).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024)),
        )
        .route("/generate/case-study", post(generate::case_study::<S>))
        .route("/generate/captions", post(generate::captions::<S>))
        .route("/events", get(events::toasts::<S>))
        .with_state(state.clone()),
    )
    .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_admin::<S>));

  let admin_pages = Router::new()
    .route("/admin", get(pages::admin_shell))
    .route("/admin/{*rest}", get(pages::admin_shell))
    .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_admin_page::<S>));

  let public_api = atelier_api::public_router(state.client.with_access(Access::Public));

  Router::new()
    .route("/", get(pages::home::<S>))
    .route("/login", get(pages::login))
    .route("/health", get(|| async { "ok" }))
    .route("/api/auth/login", post(auth::login::<S>))
    .route("/api/auth/logout", post(auth::logout::<S>))
    .route("/api/auth/session", get(auth::session::<S>))
    .route("/api/contact", post(contact::submit::<S>))
    .route("/api/contact/fallback", post(contact::fallback::<S>))
    .route("/api/live/site-content", get(live::site_content::<S>))
    .route("/api/live/{collection}", get(live::collection::<S>))
    .with_state(state)
    .nest("/api/admin", admin_api)
    .nest("/api", public_api)
    .merge(admin_pages)
    .layer(PropagateRequestIdLayer::x_request_id())
    .layer(TraceLayer::new_for_http())
    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests;
