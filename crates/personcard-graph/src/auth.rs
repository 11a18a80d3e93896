//! Access token acquisition.
//!
//! Every call states the scopes it needs; a provider may use them for
//! incremental consent or ignore them.

use std::future::Future;

use crate::{Error, Result};

pub trait TokenProvider: Send + Sync {
  /// A bearer token valid for at least one of `scopes`.
  fn access_token<'a>(
    &'a self,
    scopes: &'a [String],
  ) -> impl Future<Output = Result<String>> + Send + 'a;
}

/// A pre-acquired token, e.g. from configuration or the environment.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
  pub fn new(token: impl Into<String>) -> Self { Self(token.into()) }
}

impl std::fmt::Debug for StaticToken {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("StaticToken(..)")
  }
}

impl TokenProvider for StaticToken {
  async fn access_token(&self, _scopes: &[String]) -> Result<String> {
    let token = self.0.trim();
    if token.is_empty() {
      return Err(Error::MissingToken);
    }
    Ok(token.to_owned())
  }
}
