//! Async HTTP client wrapping the ninas JSON API.

use anyhow::{Context, Result, anyhow};
use ninas_core::visit::{NewVisit, Visit};
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;

/// Connection settings for the ninas API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub token:    String,
}

/// Body of a successful `POST /visits`.
#[derive(Debug, Deserialize)]
pub struct Recorded {
  pub status: String,
  pub id:     i64,
}

/// Async HTTP client for the ninas JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .user_agent(concat!("ninas-cli/", env!("CARGO_PKG_VERSION")))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Turn a non-2xx response into an error carrying the server's
  /// `{"error": ...}` message when there is one.
  async fn check(what: &str, resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let message = resp
      .json::<serde_json::Value>()
      .await
      .ok()
      .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
      .unwrap_or_default();
    Err(anyhow!("{what} → {status} {message}"))
  }

  // ── Write ─────────────────────────────────────────────────────────────────

  /// `POST /visits`
  pub async fn record(&self, visit: &NewVisit) -> Result<Recorded> {
    if self.config.token.is_empty() {
      return Err(anyhow!("no API token configured (use --token or NINAS_TOKEN)"));
    }
    tracing::debug!(subject = %visit.subject, "POST /visits");

    let resp = self
      .client
      .post(self.url("/visits"))
      .bearer_auth(&self.config.token)
      .json(visit)
      .send()
      .await
      .context("POST /visits failed")?;

    Self::check("POST /visits", resp)
      .await?
      .json()
      .await
      .context("deserialising confirmation")
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_visits(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<Visit>> {
    tracing::debug!(path, "GET");
    let resp = self
      .client
      .get(self.url(path))
      .query(query)
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;

    Self::check(&format!("GET {path}"), resp)
      .await?
      .json()
      .await
      .context("deserialising visits")
  }

  /// `GET /visits`
  pub async fn list_all(&self) -> Result<Vec<Visit>> { self.get_visits("/visits", &[]).await }

  /// `GET /visits/recent?limit=<n>`
  pub async fn list_recent(&self, limit: usize) -> Result<Vec<Visit>> {
    self
      .get_visits("/visits/recent", &[("limit", limit.to_string())])
      .await
  }

  /// `GET /visits/window?subject=<s>&days=<d>`
  pub async fn window(&self, subject: &str, days: u32) -> Result<Vec<Visit>> {
    self
      .get_visits(
        "/visits/window",
        &[("subject", subject.to_owned()), ("days", days.to_string())],
      )
      .await
  }

  /// `GET /visits/last?subject=<s>`; `None` when the server answers `{}`.
  pub async fn last(&self, subject: &str) -> Result<Option<Visit>> {
    tracing::debug!(subject, "GET /visits/last");
    let resp = self
      .client
      .get(self.url("/visits/last"))
      .query(&[("subject", subject)])
      .send()
      .await
      .context("GET /visits/last failed")?;

    let value: serde_json::Value = Self::check("GET /visits/last", resp)
      .await?
      .json()
      .await
      .context("deserialising last visit")?;

    if value.as_object().is_some_and(|o| o.is_empty()) {
      return Ok(None);
    }
    serde_json::from_value(value)
      .map(Some)
      .context("deserialising last visit")
  }
}
