//! The `VisitStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `ninas-store-sqlite`).
//! Higher layers (`ninas-api`, `ninas-server`) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use crate::visit::{NewVisit, Visit};

/// Abstraction over a visit store backend.
///
/// Every operation is a single statement against durable storage; nothing is
/// cached between calls. Visits are append-only.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait VisitStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Append one visit and return its store-assigned id.
  ///
  /// The timestamps are stored exactly as given; callers validate them.
  fn insert_visit(
    &self,
    input: NewVisit,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Every visit, newest `start_time` first.
  fn list_all_visits(&self) -> impl Future<Output = Result<Vec<Visit>, Self::Error>> + Send + '_;

  /// The newest `limit` visits by `start_time`.
  fn list_recent_visits(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Visit>, Self::Error>> + Send + '_;

  /// The visit for `subject` with the latest `end_time`, or `None` when the
  /// subject has never been recorded.
  fn get_last_visit<'a>(
    &'a self,
    subject: &'a str,
  ) -> impl Future<Output = Result<Option<Visit>, Self::Error>> + Send + 'a;

  /// Visits for `subject` whose `end_time` lies within the trailing `days`
  /// days, inclusive at both ends: `[now - days * 24h, now]`. Newest
  /// `end_time` first.
  fn list_visits_in_window<'a>(
    &'a self,
    subject: &'a str,
    days: u32,
  ) -> impl Future<Output = Result<Vec<Visit>, Self::Error>> + Send + 'a;

  /// Distinct subject names, alphabetically.
  fn list_subjects(&self) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;
}
