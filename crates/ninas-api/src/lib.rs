//! JSON REST API for Ninas.
//!
//! Exposes an axum [`Router`] backed by any [`ninas_core::store::VisitStore`].
//! Reads are open; the single write endpoint requires the shared bearer
//! token. TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(ninas_api::api_router(ApiState::new(store.clone(), token)))
//! ```

pub mod auth;
pub mod error;
pub mod legacy;
pub mod visits;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use ninas_core::store::VisitStore;

pub use auth::ApiToken;
pub use error::ApiError;

/// State shared by every API handler.
#[derive(Clone)]
pub struct ApiState<S> {
  pub store: Arc<S>,
  pub token: Arc<ApiToken>,
}

impl<S> ApiState<S> {
  pub fn new(store: Arc<S>, token: ApiToken) -> Self { Self { store, token: Arc::new(token) } }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type. Methods a route does not list get a JSON 405.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: VisitStore + Clone + Send + Sync + 'static,
{
  let not_allowed = visits::method_not_allowed;

  Router::new()
    .route(
      "/visits",
      get(visits::list_all::<S>)
        .post(visits::record::<S>)
        .fallback(not_allowed),
    )
    .route("/visits/recent", get(visits::list_recent::<S>).fallback(not_allowed))
    .route("/visits/last", get(visits::last::<S>).fallback(not_allowed))
    .route("/visits/window", get(visits::window::<S>).fallback(not_allowed))
    // Paths used by deployed recorders.
    .route(
      "/api/record_visit.php",
      post(visits::record::<S>)
        .get(legacy::recent::<S>)
        .fallback(not_allowed),
    )
    .route("/api/read_visits.php", get(legacy::read_all::<S>).fallback(not_allowed))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
