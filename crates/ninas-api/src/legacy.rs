//! Endpoints at the paths the first generation of recorders was built
//! against. Deployed recorders and the old dashboard keep working without
//! reconfiguration.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/record_visit.php` | Same as `POST /visits` |
//! | `GET`  | `/api/record_visit.php` | Newest 10 visits; bearer token required |
//! | `GET`  | `/api/read_visits.php` | Every visit, newest `start_time` first |
//!
//! Reads here name the subject `dog`, as those clients expect.

use axum::{Json, extract::State};
use chrono::NaiveDateTime;
use ninas_core::{store::VisitStore, visit::Visit};
use serde::Serialize;

use crate::{ApiState, auth::Authorized, error::ApiError, visits::DEFAULT_RECENT_LIMIT};

/// A visit in the shape the legacy endpoints returned.
#[derive(Debug, Serialize)]
pub struct LegacyVisit {
  pub id:         i64,
  pub dog:        String,
  pub start_time: String,
  pub end_time:   String,
  pub created_at: NaiveDateTime,
}

impl From<Visit> for LegacyVisit {
  fn from(v: Visit) -> Self {
    Self {
      id:         v.id,
      dog:        v.subject,
      start_time: v.start_time,
      end_time:   v.end_time,
      created_at: v.created_at,
    }
  }
}

fn legacy(visits: Vec<Visit>) -> Json<Vec<LegacyVisit>> {
  Json(visits.into_iter().map(LegacyVisit::from).collect())
}

/// `GET /api/read_visits.php`
pub async fn read_all<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<LegacyVisit>>, ApiError>
where
  S: VisitStore + Clone + Send + Sync + 'static,
{
  let visits = state.store.list_all_visits().await.map_err(ApiError::store)?;
  Ok(legacy(visits))
}

/// `GET /api/record_visit.php`
pub async fn recent<S>(
  _auth: Authorized,
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<LegacyVisit>>, ApiError>
where
  S: VisitStore + Clone + Send + Sync + 'static,
{
  let visits = state
    .store
    .list_recent_visits(DEFAULT_RECENT_LIMIT)
    .await
    .map_err(ApiError::store)?;
  Ok(legacy(visits))
}
