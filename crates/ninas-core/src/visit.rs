//! Visit: one recorded interval event for a named subject.
//!
//! `start_time` and `end_time` are kept exactly as the recorder sent them.
//! They are naive timestamps, treated as UTC by convention; [`parse_timestamp`]
//! turns them into [`NaiveDateTime`]s when something needs to compute with
//! them.

use chrono::{NaiveDateTime, TimeDelta, Timelike as _};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A persisted visit. Never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
  pub id:         i64,
  /// Who the visit pertains to. Older recorders call this field `dog`.
  #[serde(alias = "dog")]
  pub subject:    String,
  pub start_time: String,
  pub end_time:   String,
  /// Server-assigned insertion time (UTC).
  pub created_at: NaiveDateTime,
}

/// Input to [`VisitStore::insert_visit`](crate::store::VisitStore::insert_visit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVisit {
  pub subject:    String,
  pub start_time: String,
  pub end_time:   String,
}

impl NewVisit {
  pub fn new(
    subject: impl Into<String>,
    start_time: impl Into<String>,
    end_time: impl Into<String>,
  ) -> Self {
    Self {
      subject:    subject.into(),
      start_time: start_time.into(),
      end_time:   end_time.into(),
    }
  }
}

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// `d` is any ASCII digit, `T` is `T` or a space, anything else is literal.
const SHAPE: &[u8] = b"dddd-dd-ddTdd:dd:dd";

/// Parse a visit timestamp.
///
/// Accepts `YYYY-MM-DDTHH:MM:SS[.fff]`, with a space allowed in place of the
/// `T`, optionally followed by `Z` or a `+HH:MM`/`-HH:MM` offset (converted to
/// UTC). Nothing else is accepted: no surrounding whitespace, no lowercase
/// separators, no signed or extended years, no leap seconds. SQLite's date
/// functions read every accepted spelling as the same instant, which the
/// store relies on for ordering and windows.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
  let invalid = || Error::InvalidTimestamp(s.to_owned());

  let (naive, offset) = split_offset(s).ok_or_else(invalid)?;
  if !matches_shape(naive) {
    return Err(invalid());
  }
  let dt = NAIVE_FORMATS
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
    .ok_or_else(invalid)?;
  // chrono reads `:60` as a leap second.
  if dt.nanosecond() >= 1_000_000_000 {
    return Err(invalid());
  }
  dt.checked_sub_signed(offset).ok_or_else(invalid)
}

fn matches_shape(s: &str) -> bool {
  let b = s.as_bytes();
  if b.len() < SHAPE.len() {
    return false;
  }
  let (head, frac) = b.split_at(SHAPE.len());

  let head_ok = head.iter().zip(SHAPE).all(|(&c, &p)| match p {
    b'd' => c.is_ascii_digit(),
    b'T' => c == b'T' || c == b' ',
    p => c == p,
  });
  let frac_ok = match frac {
    [] => true,
    [b'.', digits @ ..] => {
      (1..=9).contains(&digits.len()) && digits.iter().all(u8::is_ascii_digit)
    }
    _ => false,
  };
  head_ok && frac_ok
}

/// Split a trailing `Z` or `±HH:MM` off `s`. `None` when the offset is out
/// of range.
fn split_offset(s: &str) -> Option<(&str, TimeDelta)> {
  if let Some(naive) = s.strip_suffix('Z') {
    return Some((naive, TimeDelta::zero()));
  }
  let at = s.len().saturating_sub(6);
  let (Some(naive), Some(tz)) = (s.get(..at), s.get(at..)) else {
    return Some((s, TimeDelta::zero()));
  };
  let &[sign @ (b'+' | b'-'), h1, h2, b':', m1, m2] = tz.as_bytes() else {
    return Some((s, TimeDelta::zero()));
  };

  let digit = |c: u8| c.is_ascii_digit().then(|| i64::from(c - b'0'));
  let hours = digit(h1)? * 10 + digit(h2)?;
  let minutes = digit(m1)? * 10 + digit(m2)?;
  if hours > 14 || minutes > 59 {
    return None;
  }

  let offset = TimeDelta::minutes(hours * 60 + minutes);
  Some((naive, if sign == b'-' { -offset } else { offset }))
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
      .unwrap()
      .and_hms_opt(h, m, s)
      .unwrap()
  }

  #[test]
  fn parses_t_and_space_separators() {
    assert_eq!(parse_timestamp("2024-01-01T08:00:00").unwrap(), at(8, 0, 0));
    assert_eq!(parse_timestamp("2024-01-01 08:00:00").unwrap(), at(8, 0, 0));
  }

  #[test]
  fn parses_fractional_seconds() {
    let dt = parse_timestamp("2024-01-01T08:00:00.250000").unwrap();
    assert_eq!(dt.and_utc().timestamp_subsec_millis(), 250);
  }

  #[test]
  fn offsets_are_converted_to_utc() {
    assert_eq!(parse_timestamp("2024-01-01T10:00:00+02:00").unwrap(), at(8, 0, 0));
    assert_eq!(parse_timestamp("2024-01-01T08:00:00Z").unwrap(), at(8, 0, 0));
  }

  #[test]
  fn negative_offsets_and_fractions_together() {
    let dt = parse_timestamp("2024-01-01 03:30:00.5-04:30").unwrap();
    assert_eq!(dt, at(8, 0, 0) + chrono::TimeDelta::milliseconds(500));
  }

  #[test]
  fn rejects_garbage() {
    assert!(parse_timestamp("yesterday").is_err());
    assert!(parse_timestamp("2024-13-01T00:00:00").is_err());
    assert!(parse_timestamp("").is_err());
    assert!(parse_timestamp("2024-01-01").is_err());
    assert!(parse_timestamp("2024-01-01T08:00").is_err());
  }

  #[test]
  fn rejects_spellings_sqlite_cannot_read() {
    for s in [
      " 2024-01-07T08:05:00",
      "2024-01-07T08:05:00 ",
      "2024-01-07T08:05:60",
      "2024-01-07t08:05:00Z",
      "2024-01-07T08:05:00z",
      "+2024-01-07T08:05:00",
      "+02024-01-07T08:05:00",
      "2024-01-07T08:05:00.",
      "2024-01-07T08:05:00+15:00",
      "2024-01-07T08:05:00+0200",
      "2024-1-7T08:05:00",
      "2024-01-07T08:05:00é",
    ] {
      assert!(parse_timestamp(s).is_err(), "{s:?}");
    }
  }

  #[test]
  fn visit_accepts_dog_alias() {
    let json = r#"{
      "id": 3,
      "dog": "Nova",
      "start_time": "2024-01-01T08:00:00",
      "end_time": "2024-01-01T08:05:00",
      "created_at": "2024-01-01T08:05:01"
    }"#;
    let visit: Visit = serde_json::from_str(json).unwrap();
    assert_eq!(visit.subject, "Nova");
    assert_eq!(visit.created_at, at(8, 5, 1));
  }
}
