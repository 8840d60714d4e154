//! `ninas`: record and inspect visits from the command line.
//!
//! # Usage
//!
//! ```
//! ninas --url http://localhost:8080 --token <token> record Mila --start 2024-01-01T08:00:00
//! ninas last Mila
//! ninas window Mila --days 7
//! ninas --config ~/.config/ninas/config.toml recent --limit 5
//! ```

mod client;

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use ninas_core::{
  display::{duration, time_ago, time_range},
  visit::{NewVisit, Visit, parse_timestamp},
};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "ninas", about = "Record and inspect Ninas visits")]
struct Args {
  /// Path to a TOML config file (url, token).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the ninas server (default: http://localhost:8080).
  #[arg(long, env = "NINAS_URL")]
  url: Option<String>,

  /// Shared API token; only needed for `record`.
  #[arg(long, env = "NINAS_TOKEN", hide_env_values = true)]
  token: Option<String>,

  /// Print raw JSON instead of a summary.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Record one visit.
  Record {
    subject: String,
    /// Start of the visit (e.g. 2024-01-01T08:00:00, UTC).
    #[arg(long)]
    start:   String,
    /// End of the visit; defaults to now.
    #[arg(long)]
    end:     Option<String>,
  },
  /// Every visit, newest first.
  List,
  /// The newest visits.
  Recent {
    #[arg(long, default_value_t = 10)]
    limit: usize,
  },
  /// The most recent visit for a subject.
  Last { subject: String },
  /// A subject's visits within the trailing number of days.
  Window {
    subject: String,
    #[arg(long, default_value_t = 7)]
    days:    u32,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:   String,
  #[serde(default)]
  token: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
    token:    args
      .token
      .or_else(|| (!file_cfg.token.is_empty()).then(|| file_cfg.token.clone()))
      .unwrap_or_default(),
  };

  let client = ApiClient::new(api_config)?;
  let now = Utc::now().naive_utc();

  match args.command {
    Command::Record { subject, start, end } => {
      let end = end.unwrap_or_else(|| now.format("%Y-%m-%dT%H:%M:%S").to_string());
      // Catch typos before they reach the server.
      parse_timestamp(&start).context("--start")?;
      parse_timestamp(&end).context("--end")?;

      let recorded = client.record(&NewVisit::new(subject, start, end)).await?;
      if args.json {
        println!("{}", serde_json::json!({ "status": recorded.status, "id": recorded.id }));
      } else {
        println!("recorded visit {}", recorded.id);
      }
    }
    Command::List => print_visits(&client.list_all().await?, args.json, now)?,
    Command::Recent { limit } => print_visits(&client.list_recent(limit).await?, args.json, now)?,
    Command::Last { subject } => match client.last(&subject).await? {
      Some(v) if args.json => println!("{}", serde_json::to_string_pretty(&v)?),
      Some(v) => println!("{}", summary(&v, now)),
      None if args.json => println!("{{}}"),
      None => println!("No data"),
    },
    Command::Window { subject, days } => {
      print_visits(&client.window(&subject, days).await?, args.json, now)?
    }
  }

  Ok(())
}

// ─── Output ───────────────────────────────────────────────────────────────────

fn summary(v: &Visit, now: NaiveDateTime) -> String {
  format!(
    "#{:<5} {:<10} {}  ({}, {})",
    v.id,
    v.subject,
    time_range(&v.start_time, &v.end_time),
    duration(&v.start_time, &v.end_time),
    time_ago(&v.end_time, now),
  )
}

fn print_visits(visits: &[Visit], json: bool, now: NaiveDateTime) -> Result<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(visits)?);
  } else if visits.is_empty() {
    println!("No visit data available.");
  } else {
    for v in visits {
      println!("{}", summary(v, now));
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn summary_line() {
    let v = Visit {
      id:         7,
      subject:    "Mila".into(),
      start_time: "2024-01-01T08:00:00".into(),
      end_time:   "2024-01-01T08:05:00".into(),
      created_at: parse_timestamp("2024-01-01T08:05:01").unwrap(),
    };
    let now = parse_timestamp("2024-01-01T08:15:00").unwrap();
    assert_eq!(
      summary(&v, now),
      "#7     Mila       Mon 01/01, 8:00AM - 8:05AM  (5m 0s, 10m ago)"
    );
  }

  #[test]
  fn parses_record_command() {
    let args = Args::try_parse_from([
      "ninas", "--url", "http://pi:8080", "record", "Nova", "--start", "2024-01-01T08:00:00",
    ])
    .unwrap();
    match args.command {
      Command::Record { subject, start, end } => {
        assert_eq!(subject, "Nova");
        assert_eq!(start, "2024-01-01T08:00:00");
        assert!(end.is_none());
      }
      other => panic!("unexpected command: {other:?}"),
    }
  }

  #[test]
  fn config_file_fields_are_optional() {
    let cfg: ConfigFile = toml::from_str("url = \"http://pi:8080\"").unwrap();
    assert_eq!(cfg.url, "http://pi:8080");
    assert!(cfg.token.is_empty());
  }
}
