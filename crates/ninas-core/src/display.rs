//! Human-readable renderings of visit timestamps for the dashboard.
//!
//! Every function here is pure. Malformed input renders as [`INVALID`]
//! rather than failing, so a single bad row cannot break a page.

use chrono::{NaiveDateTime, TimeDelta};

use crate::visit::parse_timestamp;

/// Shown in place of any value that cannot be computed.
pub const INVALID: &str = "Invalid date";

const CLOCK_FORMAT: &str = "%-I:%M%p";
const DAY_FORMAT: &str = "%a %m/%d";

/// Relative age of `ts` as seen from `now`: `42s ago`, `5m ago`, `3hr ago`,
/// `2d ago`. Timestamps in the future render as `just now`.
pub fn time_ago(ts: &str, now: NaiveDateTime) -> String {
  let Ok(ts) = parse_timestamp(ts) else {
    return INVALID.to_owned();
  };

  let delta = now - ts;
  if delta < TimeDelta::zero() {
    return "just now".to_owned();
  }

  let secs = delta.num_seconds();
  match secs {
    s if s < 60 => format!("{s}s ago"),
    s if s < 3_600 => format!("{}m ago", s / 60),
    s if s < 86_400 => format!("{}hr ago", s / 3_600),
    _ => format!("{}d ago", delta.num_days()),
  }
}

/// Absolute span, e.g. `Mon 01/01, 8:00AM - 8:05AM`. The day is repeated on
/// the right-hand side only when the visit crosses midnight.
pub fn time_range(start: &str, end: &str) -> String {
  let (Ok(start), Ok(end)) = (parse_timestamp(start), parse_timestamp(end)) else {
    return INVALID.to_owned();
  };

  let left = format!("{}, {}", start.format(DAY_FORMAT), start.format(CLOCK_FORMAT));
  if start.date() == end.date() {
    format!("{left} - {}", end.format(CLOCK_FORMAT))
  } else {
    format!("{left} - {}, {}", end.format(DAY_FORMAT), end.format(CLOCK_FORMAT))
  }
}

/// Length of the visit, e.g. `1h 2m 3s`, `5m 0s`, `12s`.
pub fn duration(start: &str, end: &str) -> String {
  let (Ok(start), Ok(end)) = (parse_timestamp(start), parse_timestamp(end)) else {
    return INVALID.to_owned();
  };

  let secs = (end - start).num_seconds();
  if secs < 0 {
    return INVALID.to_owned();
  }

  let (h, m, s) = (secs / 3_600, (secs % 3_600) / 60, secs % 60);
  if h > 0 {
    format!("{h}h {m}m {s}s")
  } else if m > 0 {
    format!("{m}m {s}s")
  } else {
    format!("{s}s")
  }
}
