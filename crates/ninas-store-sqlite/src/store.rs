//! [`SqliteStore`], the SQLite implementation of [`VisitStore`].

use std::path::Path;

use chrono::{NaiveDateTime, TimeDelta, Utc};
use rusqlite::OptionalExtension as _;

use ninas_core::{
  store::VisitStore,
  visit::{NewVisit, Visit},
};

use crate::{
  encode::{RawVisit, VISIT_COLUMNS, encode_dt},
  schema::SCHEMA,
  Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A visit store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Like [`VisitStore::list_visits_in_window`], but measured from `now`
  /// instead of the current instant.
  ///
  /// The window is `[now - days * 24h, now]`; a visit ending exactly on
  /// either boundary is included.
  pub async fn list_visits_in_window_as_of(
    &self,
    subject: &str,
    days:    u32,
    now:     NaiveDateTime,
  ) -> Result<Vec<Visit>> {
    let subject  = subject.to_owned();
    // A window reaching past the earliest representable date has no lower
    // bound.
    let from_str = now
      .checked_sub_signed(TimeDelta::days(days.into()))
      .map(encode_dt);
    let to_str   = encode_dt(now);

    let raws: Vec<RawVisit> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {VISIT_COLUMNS} FROM visits
           WHERE subject = ?1
             AND (?2 IS NULL OR julianday(end_time) >= julianday(?2))
             AND julianday(end_time) <= julianday(?3)
           ORDER BY julianday(end_time) DESC, id DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![subject, from_str, to_str], RawVisit::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVisit::into_visit).collect()
  }
}

// ─── VisitStore impl ─────────────────────────────────────────────────────────

impl VisitStore for SqliteStore {
  type Error = crate::Error;

  async fn insert_visit(&self, input: NewVisit) -> Result<i64> {
    let NewVisit { subject, start_time, end_time } = input;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO visits (subject, start_time, end_time) VALUES (?1, ?2, ?3)",
          rusqlite::params![subject, start_time, end_time],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(id)
  }

  async fn list_all_visits(&self) -> Result<Vec<Visit>> {
    let raws: Vec<RawVisit> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {VISIT_COLUMNS} FROM visits
           ORDER BY julianday(start_time) DESC, id DESC"
        ))?;
        let rows = stmt
          .query_map([], RawVisit::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVisit::into_visit).collect()
  }

  async fn list_recent_visits(&self, limit: usize) -> Result<Vec<Visit>> {
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawVisit> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {VISIT_COLUMNS} FROM visits
           ORDER BY julianday(start_time) DESC, id DESC
           LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], RawVisit::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVisit::into_visit).collect()
  }

  async fn get_last_visit(&self, subject: &str) -> Result<Option<Visit>> {
    let subject = subject.to_owned();

    let raw: Option<RawVisit> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {VISIT_COLUMNS} FROM visits
               WHERE subject = ?1
               ORDER BY julianday(end_time) DESC, id DESC
               LIMIT 1"
            ),
            rusqlite::params![subject],
            RawVisit::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawVisit::into_visit).transpose()
  }

  async fn list_visits_in_window(&self, subject: &str, days: u32) -> Result<Vec<Visit>> {
    self
      .list_visits_in_window_as_of(subject, days, Utc::now().naive_utc())
      .await
  }

  async fn list_subjects(&self) -> Result<Vec<String>> {
    let subjects = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT DISTINCT subject FROM visits ORDER BY subject")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(subjects)
  }
}
