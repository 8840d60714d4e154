//! Handlers for `/visits` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/visits` | Every visit, newest `start_time` first |
//! | `GET`  | `/visits/recent` | `?limit=N` (default 10, at most 100) |
//! | `GET`  | `/visits/last` | `?subject=S`; `{}` when S has no visits |
//! | `GET`  | `/visits/window` | `?subject=S&days=D` |
//! | `POST` | `/visits` | Bearer token; body: [`RecordBody`] |
//!
//! `subject` is also accepted under its older name, `dog`.

use axum::{
  Json,
  body::Bytes,
  extract::{Query, State, rejection::QueryRejection},
  response::{IntoResponse, Response},
};
use ninas_core::{
  store::VisitStore,
  visit::{NewVisit, Visit, parse_timestamp},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{ApiState, auth::Authorized, error::ApiError};

pub const DEFAULT_RECENT_LIMIT: usize = 10;
pub const MAX_RECENT_LIMIT: usize = 100;
pub const MAX_WINDOW_DAYS: u32 = 3650;

fn query_error(rejection: QueryRejection) -> ApiError {
  ApiError::InvalidInput(rejection.body_text())
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /visits`
pub async fn list_all<S>(State(state): State<ApiState<S>>) -> Result<Json<Vec<Visit>>, ApiError>
where
  S: VisitStore + Clone + Send + Sync + 'static,
{
  let visits = state.store.list_all_visits().await.map_err(ApiError::store)?;
  Ok(Json(visits))
}

#[derive(Debug, Deserialize)]
pub struct RecentParams {
  pub limit: Option<usize>,
}

/// `GET /visits/recent[?limit=N]`
pub async fn list_recent<S>(
  State(state): State<ApiState<S>>,
  params: Result<Query<RecentParams>, QueryRejection>,
) -> Result<Json<Vec<Visit>>, ApiError>
where
  S: VisitStore + Clone + Send + Sync + 'static,
{
  let Query(params) = params.map_err(query_error)?;
  let limit = params
    .limit
    .unwrap_or(DEFAULT_RECENT_LIMIT)
    .min(MAX_RECENT_LIMIT);

  let visits = state
    .store
    .list_recent_visits(limit)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(visits))
}

// ─── Per subject ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubjectParams {
  #[serde(alias = "dog")]
  pub subject: String,
}

/// `GET /visits/last?subject=S`: the visit object, or `{}`.
pub async fn last<S>(
  State(state): State<ApiState<S>>,
  params: Result<Query<SubjectParams>, QueryRejection>,
) -> Result<Response, ApiError>
where
  S: VisitStore + Clone + Send + Sync + 'static,
{
  let Query(params) = params.map_err(query_error)?;

  let visit = state
    .store
    .get_last_visit(&params.subject)
    .await
    .map_err(ApiError::store)?;

  Ok(match visit {
    Some(v) => Json(v).into_response(),
    None => Json(json!({})).into_response(),
  })
}

#[derive(Debug, Deserialize)]
pub struct WindowParams {
  #[serde(alias = "dog")]
  pub subject: String,
  pub days:    u32,
}

/// `GET /visits/window?subject=S&days=D`
pub async fn window<S>(
  State(state): State<ApiState<S>>,
  params: Result<Query<WindowParams>, QueryRejection>,
) -> Result<Json<Vec<Visit>>, ApiError>
where
  S: VisitStore + Clone + Send + Sync + 'static,
{
  let Query(params) = params.map_err(query_error)?;
  if params.days > MAX_WINDOW_DAYS {
    return Err(ApiError::InvalidInput(format!(
      "days must be at most {MAX_WINDOW_DAYS}"
    )));
  }

  let visits = state
    .store
    .list_visits_in_window(&params.subject, params.days)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(visits))
}

// ─── Record ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /visits`.
///
/// Fields are optional here so that a missing one is reported as invalid input
/// rather than a deserialisation failure.
#[derive(Debug, Default, Deserialize)]
pub struct RecordBody {
  #[serde(alias = "dog")]
  pub subject:    Option<String>,
  pub start_time: Option<String>,
  pub end_time:   Option<String>,
}

impl RecordBody {
  /// Check every field is present and both timestamps parse. The strings are
  /// passed on unchanged.
  pub fn validate(self) -> Result<NewVisit, ApiError> {
    let invalid = || ApiError::InvalidInput("Invalid input data".to_owned());

    let subject = self
      .subject
      .filter(|s| !s.trim().is_empty())
      .ok_or_else(invalid)?;
    let start_time = self.start_time.ok_or_else(invalid)?;
    let end_time = self.end_time.ok_or_else(invalid)?;

    for ts in [&start_time, &end_time] {
      parse_timestamp(ts)
        .map_err(|e| ApiError::InvalidInput(format!("Invalid input data: {e}")))?;
    }

    Ok(NewVisit { subject, start_time, end_time })
  }
}

#[derive(Debug, Serialize)]
pub struct Recorded {
  pub status: &'static str,
  pub id:     i64,
}

/// `POST /visits`, returning `{"status":"success","id":N}`.
///
/// The body is read only after the bearer token has been accepted, and is
/// parsed as JSON whatever the `Content-Type`.
pub async fn record<S>(
  _auth: Authorized,
  State(state): State<ApiState<S>>,
  body: Bytes,
) -> Result<Json<Recorded>, ApiError>
where
  S: VisitStore + Clone + Send + Sync + 'static,
{
  let body: RecordBody = serde_json::from_slice(&body)
    .map_err(|e| ApiError::InvalidInput(format!("Invalid input data: {e}")))?;
  let input = body.validate()?;
  let subject = input.subject.clone();

  let id = state.store.insert_visit(input).await.map_err(ApiError::store)?;

  tracing::info!(id, %subject, "visit recorded");
  Ok(Json(Recorded { status: "success", id }))
}

// ─── Fallback ─────────────────────────────────────────────────────────────────

/// Any method a route does not list.
pub async fn method_not_allowed() -> ApiError { ApiError::MethodNotAllowed }
