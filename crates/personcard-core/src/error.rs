//! Error types for `personcard-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("entity has no id")]
  MissingId,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
