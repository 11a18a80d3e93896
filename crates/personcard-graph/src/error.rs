//! Error type for `personcard-graph`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{method} {path} → {status}: {body}")]
  Status {
    method: &'static str,
    path:   String,
    status: u16,
    body:   String,
  },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("no access token available")]
  MissingToken,

  #[error("batch of {0} requests exceeds the limit of {max}", max = crate::batch::MAX_BATCH_REQUESTS)]
  BatchTooLarge(usize),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
