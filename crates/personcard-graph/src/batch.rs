//! Wire format of the JSON `$batch` endpoint.

use std::collections::BTreeMap;

use personcard_core::{
  card::CardSection,
  request::{Batch, BatchResponse, BatchResponses},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Service-side cap on requests per batch.
pub const MAX_BATCH_REQUESTS: usize = 20;

#[derive(Serialize)]
pub struct BatchPayload<'a> {
  pub requests: Vec<BatchEntry<'a>>,
}

#[derive(Serialize)]
pub struct BatchEntry<'a> {
  pub id:      &'static str,
  pub method:  &'static str,
  pub url:     &'a str,
  #[serde(skip_serializing_if = "BTreeMap::is_empty")]
  pub headers: BTreeMap<&'a str, &'a str>,
}

impl<'a> BatchPayload<'a> {
  pub fn from_batch(batch: &'a Batch) -> Self {
    let requests = batch
      .requests()
      .iter()
      .map(|r| BatchEntry {
        id:      r.name.as_str(),
        method:  "GET",
        url:     &r.path,
        headers: r
          .headers
          .iter()
          .map(|(k, v)| (k.as_str(), v.as_str()))
          .collect(),
      })
      .collect();
    Self { requests }
  }
}

#[derive(Deserialize)]
pub struct BatchReply {
  #[serde(default)]
  pub responses: Vec<BatchReplyEntry>,
}

#[derive(Deserialize)]
pub struct BatchReplyEntry {
  pub id:     String,
  pub status: u16,
  #[serde(default)]
  pub body:   Value,
}

impl BatchReply {
  /// Key responses by section. Ids we never sent are dropped.
  pub fn into_responses(self) -> BatchResponses {
    self
      .responses
      .into_iter()
      .filter_map(|entry| match entry.id.parse::<CardSection>() {
        Ok(section) => Some((
          section,
          BatchResponse { status: entry.status, body: entry.body },
        )),
        Err(_) => {
          tracing::warn!(id = %entry.id, "ignoring batch response with unknown id");
          None
        }
      })
      .collect()
  }
}
