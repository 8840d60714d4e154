//! Bearer-token extractor for the write path.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use ninas_core::store::VisitStore;
use sha2::{Digest, Sha256};

use crate::{ApiState, error::ApiError};

/// The pre-shared secret recorders must present as `Authorization: Bearer <token>`.
///
/// Only a SHA-256 digest of the secret is kept. Presented tokens are hashed
/// and compared digest-to-digest, so the comparison says nothing about the
/// secret's length or how much of a guess was right.
#[derive(Clone)]
pub struct ApiToken {
  digest: [u8; 32],
}

impl ApiToken {
  pub fn new(secret: &str) -> Self { Self { digest: Sha256::digest(secret.as_bytes()).into() } }

  pub fn matches(&self, presented: &str) -> bool {
    let presented: [u8; 32] = Sha256::digest(presented.as_bytes()).into();
    presented == self.digest
  }
}

impl std::fmt::Debug for ApiToken {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("ApiToken(..)")
  }
}

/// Zero-size marker: present in the handler means the request carried the
/// right bearer token.
pub struct Authorized;

/// Verify the bearer token directly from headers.
pub fn verify_bearer(headers: &HeaderMap, token: &ApiToken) -> Result<(), ApiError> {
  let presented = headers
    .get(AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .ok_or(ApiError::Unauthorized)?;

  if token.matches(presented) {
    Ok(())
  } else {
    Err(ApiError::Unauthorized)
  }
}

impl<S> FromRequestParts<ApiState<S>> for Authorized
where
  S: VisitStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    if let Err(e) = verify_bearer(&parts.headers, &state.token) {
      tracing::warn!(uri = %parts.uri, "rejected write with bad credentials");
      return Err(e);
    }
    Ok(Authorized)
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  #[test]
  fn correct_token() {
    let token = ApiToken::new("s3cret");
    assert!(verify_bearer(&headers("Bearer s3cret"), &token).is_ok());
  }

  #[test]
  fn wrong_token() {
    let token = ApiToken::new("s3cret");
    assert!(matches!(
      verify_bearer(&headers("Bearer s3cre"), &token),
      Err(ApiError::Unauthorized)
    ));
  }

  #[test]
  fn missing_header() {
    let token = ApiToken::new("s3cret");
    assert!(matches!(
      verify_bearer(&HeaderMap::new(), &token),
      Err(ApiError::Unauthorized)
    ));
  }

  #[test]
  fn wrong_scheme() {
    let token = ApiToken::new("s3cret");
    assert!(matches!(
      verify_bearer(&headers("Basic s3cret"), &token),
      Err(ApiError::Unauthorized)
    ));
    assert!(matches!(
      verify_bearer(&headers("bearer s3cret"), &token),
      Err(ApiError::Unauthorized)
    ));
  }

  #[test]
  fn debug_does_not_leak_secret() {
    let token = ApiToken::new("s3cret");
    assert!(!format!("{token:?}").contains("s3cret"));
  }
}
