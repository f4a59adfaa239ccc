//! End-to-end tests of the full router against an in-memory store.

use std::{
  path::PathBuf,
  sync::{Arc, Mutex},
  time::Duration,
};

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use atelier_core::{
  entity::{Project, Testimonial},
  record::Record,
  site::{AiSettings, SITE_CONTENT_ID, SiteContent},
  store::DocumentStore,
};
use atelier_store_sqlite::SqliteStore;
use axum::{
  Json,
  body::Body,
  http::{HeaderMap, Method, Request, StatusCode, header},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use futures::StreamExt as _;
use rand_core::OsRng;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt as _;

use super::*;

const EMAIL: &str = "admin@studio.test";
const PASSWORD: &str = "correct horse";

fn config(hash: String, ai: Option<AiConfig>) -> ServerConfig {
  ServerConfig {
    host:                "127.0.0.1".to_string(),
    port:                8080,
    base_url:            "http://localhost:8080".to_string(),
    store_path:          PathBuf::from(":memory:"),
    admin_email:         EMAIL.to_string(),
    admin_password_hash: hash,
    image_host:          None,
    ai,
    smtp:                None,
  }
}

async fn make_state(ai: Option<AiConfig>) -> (SqliteStore, AppState<SqliteStore>) {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(PASSWORD.as_bytes(), &salt)
    .unwrap()
    .to_string();
  let state = AppState::new(Arc::new(store.clone()), config(hash, ai)).unwrap();
  (store, state)
}

fn basic() -> String { format!("Basic {}", B64.encode(format!("{EMAIL}:{PASSWORD}"))) }

struct Reply {
  status:  StatusCode,
  headers: HeaderMap,
  text:    String,
}

impl Reply {
  fn json(&self) -> Value { serde_json::from_str(&self.text).unwrap() }
}

async fn send(
  state: &AppState<SqliteStore>,
  method: Method,
  uri: &str,
  auth: Option<&str>,
  body: Option<Value>,
) -> Reply {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(auth) = auth {
    builder = builder.header(header::AUTHORIZATION, auth);
  }
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = router(state.clone()).oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let headers = resp.headers().clone();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  Reply { status, headers, text: String::from_utf8(bytes.to_vec()).unwrap() }
}

async fn enable_ai(state: &AppState<SqliteStore>, model: &str) {
  let content = SiteContent {
    ai: AiSettings { model: model.to_string(), is_enabled: true },
    ..Default::default()
  };
  state.client.save(Some(SITE_CONTENT_ID.to_string()), content).await.unwrap();
}

// ── Auth ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_issues_a_session_until_logout() {
  let (_, state) = make_state(None).await;

  let wrong = json!({ "email": EMAIL, "password": "nope" });
  let r = send(&state, Method::POST, "/api/auth/login", None, Some(wrong)).await;
  assert_eq!(r.status, StatusCode::UNAUTHORIZED);
  assert_eq!(r.json()["error"], "Invalid email or password.");

  let right = json!({ "email": EMAIL, "password": PASSWORD });
  let r = send(&state, Method::POST, "/api/auth/login", None, Some(right)).await;
  assert_eq!(r.status, StatusCode::OK);
  let cookie = r.headers[header::SET_COOKIE].to_str().unwrap();
  assert!(cookie.contains("HttpOnly"));
  let bearer = format!("Bearer {}", r.json()["token"].as_str().unwrap());

  let r = send(&state, Method::GET, "/api/auth/session", Some(&bearer), None).await;
  assert_eq!(r.json()["email"], EMAIL);

  let r = send(&state, Method::POST, "/api/auth/logout", Some(&bearer), None).await;
  assert_eq!(r.status, StatusCode::NO_CONTENT);
  let r = send(&state, Method::GET, "/api/auth/session", Some(&bearer), None).await;
  assert_eq!(r.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_api_requires_credentials() {
  let (_, state) = make_state(None).await;

  let r = send(&state, Method::GET, "/api/admin/dashboard", None, None).await;
  assert_eq!(r.status, StatusCode::UNAUTHORIZED);
  assert!(r.headers.contains_key(header::WWW_AUTHENTICATE));
  assert_eq!(r.json()["error"], "unauthorized");

  let r = send(&state, Method::GET, "/api/admin/dashboard", Some(&basic()), None).await;
  assert_eq!(r.status, StatusCode::OK);
  assert_eq!(r.json()["projects"], 0);
}

#[tokio::test]
async fn admin_pages_redirect_to_login() {
  let (_, state) = make_state(None).await;

  for uri in ["/admin", "/admin/projects"] {
    let r = send(&state, Method::GET, uri, None, None).await;
    assert_eq!(r.status, StatusCode::SEE_OTHER);
    assert_eq!(r.headers[header::LOCATION], "/login");
  }

  let token = state.sessions.open(EMAIL.to_string()).await;
  let resp = router(state.clone())
    .oneshot(
      Request::builder()
        .uri("/admin/projects")
        .header(header::COOKIE, format!("{}={token}", auth::SESSION_COOKIE))
        .body(Body::empty())
        .unwrap(),
    )
    .await
    .unwrap();
  assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
  let (_, state) = make_state(None).await;
  let r = send(&state, Method::GET, "/health", None, None).await;
  assert_eq!(r.text, "ok");
  assert!(r.headers.contains_key("x-request-id"));
}

// ── Demo data ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn demo_actions_require_the_password_again() {
  let (store, state) = make_state(None).await;

  let r = send(
    &state,
    Method::POST,
    "/api/admin/demo/fill",
    Some(&basic()),
    Some(json!({ "password": "wrong" })),
  )
  .await;
  assert_eq!(r.status, StatusCode::FORBIDDEN);
  assert_eq!(r.json(), json!({ "errors": { "password": "Incorrect password." } }));
  assert!(store.list_ids(Project::COLLECTION).await.unwrap().is_empty());

  let r = send(
    &state,
    Method::POST,
    "/api/admin/demo/fill",
    Some(&basic()),
    Some(json!({ "password": PASSWORD })),
  )
  .await;
  assert_eq!(r.status, StatusCode::OK);
  assert_eq!(r.json()["projects"], 4);
  assert_eq!(store.list_ids(Project::COLLECTION).await.unwrap().len(), 4);
}

#[tokio::test]
async fn demo_reset_leaves_testimonials_alone() {
  let (store, state) = make_state(None).await;
  let fill = json!({ "password": PASSWORD });
  send(&state, Method::POST, "/api/admin/demo/fill", Some(&basic()), Some(fill.clone())).await;
  store
    .insert(None, Testimonial {
      name:      "Grace".into(),
      role:      "CEO".into(),
      company:   None,
      content:   "Great".into(),
      image_url: None,
      order:     1,
    })
    .await
    .unwrap();

  let r = send(&state, Method::POST, "/api/admin/demo/reset", Some(&basic()), Some(fill)).await;
  assert_eq!(r.status, StatusCode::OK);
  assert_eq!(r.json()["deleted"], 7);
  assert!(store.list_ids(Project::COLLECTION).await.unwrap().is_empty());
  assert_eq!(store.list_ids(Testimonial::COLLECTION).await.unwrap().len(), 1);
}

// ── Collaborators ────────────────────────────────────────────────────────────

#[tokio::test]
async fn uploads_need_an_image_host() {
  let (_, state) = make_state(None).await;
  let r = send(&state, Method::POST, "/api/admin/uploads/signature", Some(&basic()), None).await;
  assert_eq!(r.status, StatusCode::SERVICE_UNAVAILABLE);
  assert!(r.json()["error"].as_str().unwrap().contains("not configured"));
}

/// A stand-in for the hosted model that records each request and answers
/// with `reply`.
async fn mock_model(reply: Value) -> (AiConfig, Arc<Mutex<Vec<Value>>>) {
  let seen = Arc::new(Mutex::new(Vec::new()));
  let recorder = seen.clone();
  let app = Router::new().route(
    "/v1/messages",
    post(move |Json(body): Json<Value>| {
      let recorder = recorder.clone();
      let reply = reply.clone();
      async move {
        recorder.lock().unwrap().push(body);
        Json(reply)
      }
    }),
  );
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
  let config = AiConfig {
    api_key: "test-key".into(),
    model:   "server-default".into(),
    api_url: format!("http://{addr}/v1/messages"),
  };
  (config, seen)
}

#[tokio::test]
async fn generation_is_gated_by_site_settings() {
  let (config, seen) = mock_model(json!({ "content": [] })).await;
  let (_, state) = make_state(Some(config)).await;
  let req = json!({ "title": "Aura", "description": "Identity" });

  let r = send(
    &state,
    Method::POST,
    "/api/admin/generate/case-study",
    Some(&basic()),
    Some(req),
  )
  .await;
  assert_eq!(r.status, StatusCode::FORBIDDEN);
  assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn case_study_is_drafted_with_the_site_model() {
  let text = json!({ "problem": "P", "solution": "S", "outcome": "O" }).to_string();
  let (config, seen) =
    mock_model(json!({ "content": [{ "type": "text", "text": format!("```json\n{text}\n```") }] }))
      .await;
  let (_, state) = make_state(Some(config)).await;
  enable_ai(&state, "site-model").await;

  let r = send(
    &state,
    Method::POST,
    "/api/admin/generate/case-study",
    Some(&basic()),
    Some(json!({ "title": "Aura", "description": "Identity" })),
  )
  .await;
  assert_eq!(r.status, StatusCode::OK);
  assert_eq!(r.json(), json!({ "problem": "P", "solution": "S", "outcome": "O" }));

  let sent = seen.lock().unwrap()[0].clone();
  assert_eq!(sent["model"], "site-model");
  assert!(sent["messages"][0]["content"].as_str().unwrap().contains("Aura"));
}

#[tokio::test]
async fn empty_model_output_is_a_gateway_error() {
  let (config, seen) = mock_model(json!({ "content": [] })).await;
  let (_, state) = make_state(Some(config)).await;
  enable_ai(&state, "").await;

  let r = send(
    &state,
    Method::POST,
    "/api/admin/generate/captions",
    Some(&basic()),
    Some(json!({ "projectTitle": "Aura", "category": "Branding", "tools": "Figma", "model": "override" })),
  )
  .await;
  assert_eq!(r.status, StatusCode::BAD_GATEWAY);
  assert_eq!(r.json()["error"], "the model returned no output");
  assert_eq!(seen.lock().unwrap()[0]["model"], "override");
}

#[tokio::test]
async fn generation_without_a_model_is_unavailable() {
  let (_, state) = make_state(None).await;
  enable_ai(&state, "").await;
  let r = send(
    &state,
    Method::POST,
    "/api/admin/generate/case-study",
    Some(&basic()),
    Some(json!({ "title": "Aura", "description": "Identity" })),
  )
  .await;
  assert_eq!(r.status, StatusCode::SERVICE_UNAVAILABLE);
}

// ── Contact ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn contact_message_reaches_the_admin_unread() {
  let (_, state) = make_state(None).await;

  let r = send(
    &state,
    Method::POST,
    "/api/contact",
    None,
    Some(json!({ "name": "Ada", "email": "not-an-email", "message": "Hi" })),
  )
  .await;
  assert_eq!(r.status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(r.json()["errors"]["email"], "Please enter a valid email address.");

  let r = send(
    &state,
    Method::POST,
    "/api/contact",
    None,
    Some(json!({ "name": "Ada", "email": "ada@example.com", "message": "Hi" })),
  )
  .await;
  assert_eq!(r.status, StatusCode::CREATED);
  let id = r.json()["id"].as_str().unwrap().to_string();

  let r = send(&state, Method::GET, "/api/admin/messages", Some(&basic()), None).await;
  let messages = r.json();
  assert_eq!(messages[0]["id"], id.as_str());
  assert_eq!(messages[0]["isRead"], false);
}

#[tokio::test]
async fn fallback_reports_that_no_email_was_sent() {
  let (_, state) = make_state(None).await;
  let r = send(
    &state,
    Method::POST,
    "/api/contact/fallback",
    None,
    Some(json!({ "name": "Ada", "email": "ada@example.com", "message": "Hi" })),
  )
  .await;
  assert_eq!(r.status, StatusCode::CREATED);
  assert_eq!(r.json()["notified"], false);
}

// ── Public surface ───────────────────────────────────────────────────────────

#[tokio::test]
async fn home_page_is_rendered_with_the_hidden_door() {
  let (_, state) = make_state(None).await;
  let r = send(&state, Method::GET, "/", None, None).await;
  assert_eq!(r.status, StatusCode::OK);
  assert!(r.headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
  assert!(r.text.contains("#pkadmin"));
  assert!(r.text.contains(r#"id="contact-form""#));
}

#[tokio::test]
async fn public_reads_exclude_messages() {
  let (_, state) = make_state(None).await;
  let r = send(&state, Method::GET, "/api/projects", None, None).await;
  assert_eq!(r.status, StatusCode::OK);
  assert_eq!(r.json(), json!([]));

  let r = send(&state, Method::GET, "/api/messages", None, None).await;
  assert_eq!(r.status, StatusCode::NOT_FOUND);
}

async fn first_events(state: &AppState<SqliteStore>, uri: &str, until: &str) -> String {
  let resp = router(state.clone())
    .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
    .await
    .unwrap();
  assert_eq!(resp.status(), StatusCode::OK);
  let mut body = resp.into_body().into_data_stream();
  let mut seen = String::new();
  tokio::time::timeout(Duration::from_secs(5), async {
    while let Some(Ok(chunk)) = body.next().await {
      seen.push_str(&String::from_utf8_lossy(&chunk));
      if seen.contains(until) {
        break;
      }
    }
  })
  .await
  .expect("event never arrived");
  seen
}

#[tokio::test]
async fn live_feed_streams_snapshots() {
  let (_, state) = make_state(None).await;
  let seen = first_events(&state, "/api/live/projects", r#""loading":false"#).await;
  assert!(seen.starts_with("event: snapshot"));
  assert!(seen.contains(r#""data":[]"#));
}

#[tokio::test]
async fn live_feed_of_messages_is_denied() {
  let (_, state) = make_state(None).await;
  let mut errors = state.bus.subscribe();
  let seen = first_events(&state, "/api/live/contactMessages", r#""error""#).await;
  assert!(seen.contains("permission denied"));
  assert!(errors.recv().await.unwrap().permission);

  let r = send(&state, Method::GET, "/api/live/nonsense", None, None).await;
  assert_eq!(r.status, StatusCode::NOT_FOUND);
}
