//! The `CardCache` trait: persisted card state keyed by entity id.
//!
//! Users, contacts and groups share one keyspace. Freshness is decided by
//! the caller from [`CardState::time_cached`]; the cache itself never
//! expires anything.

use std::future::Future;

use crate::card::CardState;

pub trait CardCache: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Return the stored state for `entity_id`, stale or not.
  fn get<'a>(
    &'a self,
    entity_id: &'a str,
  ) -> impl Future<Output = Result<Option<CardState>, Self::Error>> + Send + 'a;

  /// Store `state` under `entity_id`, replacing any previous entry.
  fn put<'a>(
    &'a self,
    entity_id: &'a str,
    state: &'a CardState,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
