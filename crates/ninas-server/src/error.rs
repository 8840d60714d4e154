//! Startup errors for the server.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("no API key configured; set `api_key` or `api_key_file`")]
  MissingApiKey,

  #[error("failed to read API key file {path:?}: {source}")]
  ApiKeyFile {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
