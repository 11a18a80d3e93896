//! The `GraphTransport` trait: authenticated access to the directory API.
//!
//! Implemented by `personcard-graph` over HTTPS. The assembler depends on
//! this abstraction only, which is what lets its tests run against an
//! in-process fake.

use std::future::Future;

use serde::{Serialize, de::DeserializeOwned};

use crate::request::{ApiRequest, Batch, BatchResponses};

pub trait GraphTransport: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Execute every request in `batch` in one round trip.
  ///
  /// A returned error means the batch as a whole failed; individual
  /// sub-request failures are reported through their status instead.
  fn execute_batch<'a>(
    &'a self,
    batch: &'a Batch,
  ) -> impl Future<Output = Result<BatchResponses, Self::Error>> + Send + 'a;

  /// Authenticated GET, decoding the response body as `T`.
  fn get<'a, T>(
    &'a self,
    request: &'a ApiRequest,
  ) -> impl Future<Output = Result<T, Self::Error>> + Send + 'a
  where
    T: DeserializeOwned + Send + 'static;

  /// Authenticated POST of a JSON `body`, decoding the response as `T`.
  fn post<'a, B, T>(
    &'a self,
    request: &'a ApiRequest,
    body: &'a B,
  ) -> impl Future<Output = Result<T, Self::Error>> + Send + 'a
  where
    B: Serialize + Sync + ?Sized,
    T: DeserializeOwned + Send + 'static;
}
