//! Admin authentication: the argon2 credential check, in-memory sessions,
//! the [`Authenticated`] extractor and the middleware guarding admin routes.
//!
//! A request is authenticated by any of:
//! * the `atelier_session` cookie set at sign-in,
//! * `Authorization: Bearer <session token>`,
//! * `Authorization: Basic <email:password>`.

use std::{collections::HashMap, sync::Arc};

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use atelier_core::store::DocumentStore;
use axum::{
  Json,
  extract::{FromRequestParts, Request, State},
  http::{HeaderMap, StatusCode, header, request::Parts},
  middleware::Next,
  response::{IntoResponse, Redirect, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use chrono::{DateTime, TimeDelta, Utc};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{AppState, error::Error};

pub const SESSION_COOKIE: &str = "atelier_session";

// ─── Credential ──────────────────────────────────────────────────────────────

/// The single admin credential accepted by this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub email:         String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

impl AuthConfig {
  /// A fresh argon2 check of `password`. A malformed stored hash never
  /// verifies.
  pub fn verify_password(&self, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(&self.password_hash) else {
      tracing::error!("admin password hash is not a valid PHC string");
      return false;
    };
    Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
  }

  pub fn verify(&self, email: &str, password: &str) -> Result<(), Error> {
    if !email.trim().eq_ignore_ascii_case(self.email.trim()) || !self.verify_password(password) {
      return Err(Error::InvalidCredentials);
    }
    Ok(())
  }
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
  pub email:        String,
  pub signed_in_at: DateTime<Utc>,
}

/// How long a sign-in stays valid.
pub const SESSION_LIFETIME: TimeDelta = TimeDelta::days(7);

impl Session {
  fn is_expired(&self, now: DateTime<Utc>) -> bool { now - self.signed_in_at >= SESSION_LIFETIME }
}

/// Live sessions keyed by token. Sessions end at sign-out, after
/// [`SESSION_LIFETIME`], or at restart.
#[derive(Clone, Default)]
pub struct Sessions(Arc<RwLock<HashMap<String, Session>>>);

impl Sessions {
  /// Start a session and return its token.
  pub async fn open(&self, email: String) -> String { self.open_at(email, Utc::now()).await }

  /// Start a session signed in at `signed_in_at`, dropping any that have
  /// expired by then.
  async fn open_at(&self, email: String, signed_in_at: DateTime<Utc>) -> String {
    let token = new_token();
    let mut sessions = self.0.write().await;
    let before = sessions.len();
    sessions.retain(|_, s| !s.is_expired(signed_in_at));
    if sessions.len() < before {
      tracing::debug!(pruned = before - sessions.len(), "expired sessions dropped");
    }
    sessions.insert(token.clone(), Session { email, signed_in_at });
    token
  }

  pub async fn get(&self, token: &str) -> Option<Session> {
    let now = Utc::now();
    self.0.read().await.get(token).filter(|s| !s.is_expired(now)).cloned()
  }

  pub async fn close(&self, token: &str) -> bool { self.0.write().await.remove(token).is_some() }
}

/// 32 random bytes, hex-encoded.
fn new_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

// ─── Request credentials ─────────────────────────────────────────────────────

/// Present in a handler means the request was made by the admin.
#[derive(Debug, Clone)]
pub struct Authenticated {
  pub email: String,
}

fn authorization<'a>(headers: &'a HeaderMap, scheme: &str) -> Option<&'a str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix(scheme))
    .map(str::trim)
}

fn cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(key, _)| *key == name)
    .map(|(_, value)| value)
}

/// The session token carried by the request, if any.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
  authorization(headers, "Bearer ").or_else(|| cookie(headers, SESSION_COOKIE))
}

fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let decoded = B64.decode(authorization(headers, "Basic ")?).ok()?;
  let creds = String::from_utf8(decoded).ok()?;
  let (email, password) = creds.split_once(':')?;
  Some((email.to_string(), password.to_string()))
}

/// Resolve the request's credentials to the admin, or fail with
/// [`Error::Unauthorized`].
pub async fn authenticate(
  headers: &HeaderMap,
  auth: &AuthConfig,
  sessions: &Sessions,
) -> Result<Authenticated, Error> {
  if let Some(token) = session_token(headers) {
    return sessions
      .get(token)
      .await
      .map(|s| Authenticated { email: s.email })
      .ok_or(Error::Unauthorized);
  }
  let (email, password) = basic_credentials(headers).ok_or(Error::Unauthorized)?;
  auth.verify(&email, &password).map_err(|_| Error::Unauthorized)?;
  Ok(Authenticated { email })
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: DocumentStore + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    if let Some(user) = parts.extensions.get::<Authenticated>() {
      return Ok(user.clone());
    }
    authenticate(&parts.headers, &state.auth, &state.sessions).await
  }
}

// ─── Middleware ──────────────────────────────────────────────────────────────

/// Guard for `/api/admin/*`: 401 JSON without a valid session.
pub async fn require_admin<S>(State(state): State<AppState<S>>, mut req: Request, next: Next) -> Response
where
  S: DocumentStore + 'static,
{
  let headers = req.headers().clone();
  match authenticate(&headers, &state.auth, &state.sessions).await {
    Ok(user) => {
      req.extensions_mut().insert(user);
      next.run(req).await
    }
    Err(e) => e.into_response(),
  }
}

/// Guard for `/admin` pages: redirect to the sign-in page without a session.
pub async fn require_admin_page<S>(State(state): State<AppState<S>>, req: Request, next: Next) -> Response
where
  S: DocumentStore + 'static,
{
  let headers = req.headers().clone();
  match authenticate(&headers, &state.auth, &state.sessions).await {
    Ok(_) => next.run(req).await,
    Err(_) => Redirect::to("/login").into_response(),
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
  pub email:    String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub token: String,
  pub email: String,
}

fn session_cookie(token: &str, max_age: Option<u32>) -> String {
  let mut cookie = format!("{SESSION_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax");
  if let Some(age) = max_age {
    cookie.push_str(&format!("; Max-Age={age}"));
  }
  cookie
}

/// `POST /api/auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(req): Json<LoginRequest>,
) -> Result<Response, Error>
where
  S: DocumentStore + 'static,
{
  if let Err(e) = state.auth.verify(&req.email, &req.password) {
    tracing::warn!(email = %req.email, "failed sign-in");
    return Err(e);
  }
  let email = state.auth.email.clone();
  let token = state.sessions.open(email.clone()).await;
  tracing::info!(%email, "admin signed in");
  let cookie = session_cookie(&token, u32::try_from(SESSION_LIFETIME.num_seconds()).ok());
  Ok(([(header::SET_COOKIE, cookie)], Json(LoginResponse { token, email })).into_response())
}

/// `POST /api/auth/logout`
pub async fn logout<S>(State(state): State<AppState<S>>, headers: HeaderMap) -> Response
where
  S: DocumentStore + 'static,
{
  if let Some(token) = session_token(&headers)
    && state.sessions.close(token).await
  {
    tracing::info!("admin signed out");
  }
  (StatusCode::NO_CONTENT, [(header::SET_COOKIE, session_cookie("", Some(0)))]).into_response()
}

/// `GET /api/auth/session`
pub async fn session<S>(user: Authenticated) -> Json<serde_json::Value>
where
  S: DocumentStore + 'static,
{
  Json(serde_json::json!({ "email": user.email }))
}
