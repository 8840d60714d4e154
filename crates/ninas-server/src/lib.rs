//! HTTP server for Ninas.
//!
//! Combines the JSON API from [`ninas_api`] with the dashboard page and a
//! liveness probe, backed by any [`VisitStore`].

pub mod dashboard;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Json, Router, routing::get};
use ninas_api::{ApiState, ApiToken};
use ninas_core::store::VisitStore;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `NINAS_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:         String,
  #[serde(default = "default_port")]
  pub port:         u16,
  #[serde(default = "default_store_path")]
  pub store_path:   PathBuf,
  /// The shared write secret, inline.
  #[serde(default)]
  pub api_key:      Option<String>,
  /// A file holding the shared write secret. Ignored when `api_key` is set.
  #[serde(default)]
  pub api_key_file: Option<PathBuf>,
  /// Subjects given a panel on the dashboard. Empty means every subject
  /// in the store.
  #[serde(default)]
  pub subjects:     Vec<String>,
  #[serde(default = "default_history_days")]
  pub history_days: u32,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("ninas.db") }

fn default_history_days() -> u32 { 7 }

impl ServerConfig {
  /// Resolve the shared write secret. Surrounding whitespace is dropped; an
  /// empty secret counts as missing.
  pub fn api_secret(&self) -> error::Result<String> {
    let secret = match (&self.api_key, &self.api_key_file) {
      (Some(key), _) => key.trim().to_owned(),
      (None, Some(path)) => std::fs::read_to_string(path)
        .map_err(|source| Error::ApiKeyFile { path: path.clone(), source })?
        .trim()
        .to_owned(),
      (None, None) => return Err(Error::MissingApiKey),
    };

    if secret.is_empty() {
      return Err(Error::MissingApiKey);
    }
    Ok(secret)
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: VisitStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub token:  Arc<ApiToken>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the whole server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: VisitStore + Clone + Send + Sync + 'static,
{
  let api = ninas_api::api_router(ApiState {
    store: state.store.clone(),
    token: state.token.clone(),
  });

  Router::new()
    .route("/", get(dashboard::handler::<S>))
    .route("/health", get(health))
    .with_state(state)
    .merge(api)
    .layer(TraceLayer::new_for_http())
}

/// `GET /health`
async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use ninas_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  fn config() -> ServerConfig {
    ServerConfig {
      host:         "127.0.0.1".to_string(),
      port:         8080,
      store_path:   PathBuf::from(":memory:"),
      api_key:      Some("s3cret".to_string()),
      api_key_file: None,
      subjects:     vec![],
      history_days: 7,
    }
  }

  async fn make_state(config: ServerConfig) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let token = ApiToken::new(&config.api_secret().unwrap());
    AppState {
      store:  Arc::new(store),
      config: Arc::new(config),
      token:  Arc::new(token),
    }
  }

  async fn oneshot_raw(
    state:   AppState<SqliteStore>,
    method:  &str,
    uri:     &str,
    headers: Vec<(header::HeaderName, &str)>,
    body:    &str,
  ) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
  }

  // ── Config ──────────────────────────────────────────────────────────────────

  #[test]
  fn defaults_fill_missing_fields() {
    let cfg: ServerConfig = serde_json::from_str(r#"{"api_key":"k"}"#).unwrap();
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.store_path, PathBuf::from("ninas.db"));
    assert_eq!(cfg.history_days, 7);
    assert!(cfg.subjects.is_empty());
  }

  #[test]
  fn missing_secret_is_an_error() {
    let mut cfg = config();
    cfg.api_key = None;
    assert!(matches!(cfg.api_secret(), Err(Error::MissingApiKey)));

    cfg.api_key = Some("   ".to_string());
    assert!(matches!(cfg.api_secret(), Err(Error::MissingApiKey)));
  }

  #[test]
  fn secret_file_is_trimmed() {
    let path = std::env::temp_dir().join(format!("ninas-api-key-{}.txt", std::process::id()));
    std::fs::write(&path, "from-file\n").unwrap();

    let mut cfg = config();
    cfg.api_key = None;
    cfg.api_key_file = Some(path.clone());
    assert_eq!(cfg.api_secret().unwrap(), "from-file");

    std::fs::remove_file(&path).unwrap();
    assert!(matches!(cfg.api_secret(), Err(Error::ApiKeyFile { .. })));
  }

  #[test]
  fn inline_secret_wins_over_file() {
    let mut cfg = config();
    cfg.api_key_file = Some(PathBuf::from("/nonexistent/api_key.txt"));
    assert_eq!(cfg.api_secret().unwrap(), "s3cret");
  }

  // ── Routes ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_is_ok() {
    let state = make_state(config()).await;
    let (status, body) = oneshot_raw(state, "GET", "/health", vec![], "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"ok"}"#);
  }

  #[tokio::test]
  async fn empty_store_dashboard_and_api() {
    let state = make_state(config()).await;

    let (status, body) = oneshot_raw(state.clone(), "GET", "/visits", vec![], "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");

    let (status, html) = oneshot_raw(state, "GET", "/", vec![], "").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("No visit data available"), "{html}");
  }

  #[tokio::test]
  async fn recorded_visit_shows_on_dashboard() {
    let state = make_state(config()).await;
    let body = r#"{"subject":"Mila","start_time":"2024-01-01T08:00:00","end_time":"2024-01-01T08:05:00"}"#;

    let (status, _) = oneshot_raw(
      state.clone(),
      "POST",
      "/visits",
      vec![
        (header::AUTHORIZATION, "Bearer s3cret"),
        (header::CONTENT_TYPE, "application/json"),
      ],
      body,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, html) = oneshot_raw(state, "GET", "/", vec![], "").await;
    assert!(html.contains("<h2>Mila</h2>"), "{html}");
    assert!(html.contains("Mon 01/01, 8:00AM - 8:05AM"), "{html}");
    assert!(!html.contains("No visit data available"), "{html}");
  }

  #[tokio::test]
  async fn configured_subjects_get_panels_even_without_visits() {
    let mut cfg = config();
    cfg.subjects = vec!["Mila".to_string(), "Nova".to_string()];
    let state = make_state(cfg).await;

    let (_, html) = oneshot_raw(state, "GET", "/", vec![], "").await;
    assert!(html.contains("<h2>Mila</h2>"));
    assert!(html.contains("<h2>Nova</h2>"));
    assert_eq!(html.matches("Last visit: No data").count(), 2);
  }

  #[tokio::test]
  async fn writes_require_the_configured_token() {
    let state = make_state(config()).await;
    let body = r#"{"subject":"Mila","start_time":"2024-01-01T08:00:00","end_time":"2024-01-01T08:05:00"}"#;

    let (status, resp) = oneshot_raw(
      state,
      "POST",
      "/visits",
      vec![(header::AUTHORIZATION, "Bearer wrong")],
      body,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(resp.contains("error"));
  }
}
