//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
///
/// Every variant is rendered as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  InvalidInput(String),

  /// Deliberately says nothing about whether a credential was sent at all.
  #[error("Unauthorized access")]
  Unauthorized,

  #[error("Method not allowed")]
  MethodNotAllowed,

  #[error("store error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    ApiError::Internal(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::InvalidInput(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unauthorized => (StatusCode::FORBIDDEN, self.to_string()),
      ApiError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, self.to_string()),
      ApiError::Internal(e) => {
        // The store's message stays in the server log.
        tracing::error!(error = %e, "store query failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
