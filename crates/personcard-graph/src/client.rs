//! Async HTTP client for a Microsoft Graph compatible directory API.

use std::time::Duration;

use personcard_core::{
  request::{ApiRequest, ApiVersion, Batch, BatchResponses},
  transport::GraphTransport,
};
use reqwest::{Client, RequestBuilder, header};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{
  Error, Result,
  auth::TokenProvider,
  batch::{BatchPayload, BatchReply, MAX_BATCH_REQUESTS},
};

pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com";

/// Connection settings for the directory API.
#[derive(Debug, Clone)]
pub struct GraphConfig {
  /// Service root without a version segment.
  pub base_url: String,
  pub timeout:  Duration,
}

impl Default for GraphConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
      timeout:  Duration::from_secs(30),
    }
  }
}

/// Async HTTP client for the directory API.
///
/// Cheap to clone when `T` is; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GraphClient<T> {
  client: Client,
  config: GraphConfig,
  tokens: T,
}

impl<T: TokenProvider> GraphClient<T> {
  pub fn new(config: GraphConfig, tokens: T) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config, tokens })
  }

  fn url(&self, version: ApiVersion, path: &str) -> String {
    format!(
      "{}/{}/{}",
      self.config.base_url.trim_end_matches('/'),
      version.as_str(),
      path.trim_start_matches('/')
    )
  }

  /// Attach auth and the per-call headers, send, and reject non-2xx.
  async fn send(
    &self,
    method: &'static str,
    path: &str,
    req: RequestBuilder,
    scopes: &[String],
    headers: &[(String, String)],
  ) -> Result<reqwest::Response> {
    let token = self.tokens.access_token(scopes).await?;
    let request_id = Uuid::new_v4();
    let mut req = req
      .bearer_auth(token)
      .header(header::ACCEPT, "application/json")
      .header("client-request-id", request_id.to_string());
    for (name, value) in headers {
      req = req.header(name.as_str(), value.as_str());
    }

    tracing::debug!(%method, %path, %request_id, "graph request");
    let resp = req.send().await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status {
        method,
        path: path.to_owned(),
        status: status.as_u16(),
        body,
      });
    }
    Ok(resp)
  }

  async fn decode<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R> {
    let bytes = resp.bytes().await?;
    if bytes.is_empty() {
      return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    Ok(serde_json::from_slice(&bytes)?)
  }
}

// ─── GraphTransport impl ─────────────────────────────────────────────────────

impl<T: TokenProvider> GraphTransport for GraphClient<T> {
  type Error = Error;

  async fn execute_batch(&self, batch: &Batch) -> Result<BatchResponses> {
    if batch.len() > MAX_BATCH_REQUESTS {
      return Err(Error::BatchTooLarge(batch.len()));
    }

    let payload = BatchPayload::from_batch(batch);
    let url = self.url(ApiVersion::V1, "$batch");
    let resp = self
      .send(
        "POST",
        "/$batch",
        self.client.post(url).json(&payload),
        &batch.scopes(),
        &[],
      )
      .await?;

    let reply: BatchReply = Self::decode(resp).await?;
    Ok(reply.into_responses())
  }

  async fn get<R>(&self, request: &ApiRequest) -> Result<R>
  where
    R: DeserializeOwned + Send + 'static,
  {
    let url = self.url(request.version, &request.path);
    let resp = self
      .send(
        "GET",
        &request.path,
        self.client.get(url),
        &request.scopes,
        &request.headers,
      )
      .await?;
    Self::decode(resp).await
  }

  async fn post<B, R>(&self, request: &ApiRequest, body: &B) -> Result<R>
  where
    B: Serialize + Sync + ?Sized,
    R: DeserializeOwned + Send + 'static,
  {
    let url = self.url(request.version, &request.path);
    let resp = self
      .send(
        "POST",
        &request.path,
        self.client.post(url).json(body),
        &request.scopes,
        &request.headers,
      )
      .await?;
    Self::decode(resp).await
  }
}
