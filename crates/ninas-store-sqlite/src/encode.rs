//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Visit timestamps are stored verbatim. Timestamps the store generates
//! itself use the `YYYY-MM-DD HH:MM:SS.SSS` form that SQLite's own date
//! functions produce and understand.

use chrono::NaiveDateTime;
use ninas_core::visit::{Visit, parse_timestamp};

use crate::Result;

/// Column list shared by every `SELECT` that builds a [`RawVisit`].
pub const VISIT_COLUMNS: &str = "id, subject, start_time, end_time, created_at";

// ─── NaiveDateTime ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: NaiveDateTime) -> String { dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string() }

pub fn decode_dt(s: &str) -> Result<NaiveDateTime> { Ok(parse_timestamp(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// A `visits` row exactly as read from SQLite.
pub struct RawVisit {
  pub id:         i64,
  pub subject:    String,
  pub start_time: String,
  pub end_time:   String,
  pub created_at: String,
}

impl RawVisit {
  /// Map a row selected with [`VISIT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      subject:    row.get(1)?,
      start_time: row.get(2)?,
      end_time:   row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_visit(self) -> Result<Visit> {
    Ok(Visit {
      id:         self.id,
      subject:    self.subject,
      start_time: self.start_time,
      end_time:   self.end_time,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
