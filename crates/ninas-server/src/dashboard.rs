//! `GET /`, the server-rendered dashboard.
//!
//! For each subject: the last visit and the visits inside the trailing
//! history window. Below that, every visit recorded. The page always renders;
//! a failed query shows up as "No data" and is logged.

use axum::{extract::State, response::Html};
use chrono::{NaiveDateTime, Utc};
use ninas_core::{
  display::{duration, time_ago, time_range},
  store::VisitStore,
  visit::Visit,
};
use quick_xml::escape::escape;

use crate::AppState;

const NO_DATA: &str = "No data";
const NO_VISITS: &str = "No visit data available.";

// ─── Page model ───────────────────────────────────────────────────────────────

/// Everything one subject's panel shows. `None` means the query failed.
pub struct SubjectPanel {
  pub subject: String,
  pub last:    Option<Option<Visit>>,
  pub history: Option<Vec<Visit>>,
}

pub struct Dashboard {
  pub history_days: u32,
  pub panels:       Vec<SubjectPanel>,
  /// Every visit, newest first. `None` means the query failed.
  pub visits:       Option<Vec<Visit>>,
}

fn logged<T, E: std::fmt::Display>(what: &str, result: Result<T, E>) -> Option<T> {
  result
    .inspect_err(|e| tracing::warn!(error = %e, "dashboard: {what} failed"))
    .ok()
}

/// Run the dashboard's queries. Never fails; see [`Dashboard`].
pub async fn load<S: VisitStore>(
  store: &S,
  subjects: &[String],
  history_days: u32,
) -> Dashboard {
  let subjects = if subjects.is_empty() {
    logged("listing subjects", store.list_subjects().await).unwrap_or_default()
  } else {
    subjects.to_vec()
  };

  let mut panels = Vec::with_capacity(subjects.len());
  for subject in subjects {
    let last = logged("last visit", store.get_last_visit(&subject).await);
    let history = logged(
      "history window",
      store.list_visits_in_window(&subject, history_days).await,
    );
    panels.push(SubjectPanel { subject, last, history });
  }

  let visits = logged("listing visits", store.list_all_visits().await);

  Dashboard { history_days, panels, visits }
}

// ─── Rendering ────────────────────────────────────────────────────────────────

/// Render `page` as of `now`. All interpolated text is escaped.
pub fn render(page: &Dashboard, now: NaiveDateTime) -> String {
  let mut out = String::from(
    "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
     <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
     <title>Ninas</title>\n</head>\n<body>\n<h1>Visits</h1>\n",
  );

  for panel in &page.panels {
    out.push_str(&format!("<section>\n<h2>{}</h2>\n", escape(panel.subject.as_str())));

    match &panel.last {
      Some(Some(v)) => out.push_str(&format!(
        "<p>Last visit: {} ({}, {})</p>\n",
        escape(time_ago(&v.end_time, now).as_str()),
        escape(time_range(&v.start_time, &v.end_time).as_str()),
        escape(duration(&v.start_time, &v.end_time).as_str()),
      )),
      _ => out.push_str(&format!("<p>Last visit: {NO_DATA}</p>\n")),
    }

    out.push_str(&format!("<h3>Past {} days</h3>\n", page.history_days));
    match &panel.history {
      Some(history) if !history.is_empty() => {
        out.push_str("<ul>\n");
        for v in history {
          out.push_str(&format!(
            "<li>{} ({})</li>\n",
            escape(time_range(&v.start_time, &v.end_time).as_str()),
            escape(duration(&v.start_time, &v.end_time).as_str()),
          ));
        }
        out.push_str("</ul>\n");
      }
      _ => out.push_str(&format!("<p>{NO_DATA}</p>\n")),
    }

    out.push_str("</section>\n");
  }

  out.push_str("<h2>All visits</h2>\n");
  match &page.visits {
    Some(visits) if visits.is_empty() => out.push_str(&format!("<p>{NO_VISITS}</p>\n")),
    Some(visits) => {
      out.push_str("<ul>\n");
      for v in visits {
        out.push_str(&format!(
          "<li>Subject: {}<br>Start Time: {}<br>End Time: {}<br>Recorded At: {}</li>\n",
          escape(v.subject.as_str()),
          escape(v.start_time.as_str()),
          escape(v.end_time.as_str()),
          v.created_at.format("%Y-%m-%d %H:%M:%S"),
        ));
      }
      out.push_str("</ul>\n");
    }
    None => out.push_str(&format!("<p>{NO_DATA}</p>\n")),
  }

  out.push_str("</body>\n</html>\n");
  out
}

/// `GET /`
pub async fn handler<S>(State(state): State<AppState<S>>) -> Html<String>
where
  S: VisitStore + Clone + Send + Sync + 'static,
{
  let page = load(
    state.store.as_ref(),
    &state.config.subjects,
    state.config.history_days,
  )
  .await;
  Html(render(&page, Utc::now().naive_utc()))
}
