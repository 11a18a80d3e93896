//! [`SqliteCardCache`], the SQLite implementation of [`CardCache`].

use std::path::Path;

use chrono::Utc;
use personcard_core::{cache::CardCache, card::CardState};
use rusqlite::OptionalExtension as _;

use crate::{
  Result,
  encode::{RawCard, encode_dt},
  schema::SCHEMA,
};

/// A person card cache backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteCardCache {
  conn: tokio_rusqlite::Connection,
}

impl SqliteCardCache {
  /// Open (or create) a cache at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let cache = Self { conn };
    cache.init_schema().await?;
    Ok(cache)
  }

  /// Open an in-memory cache, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let cache = Self { conn };
    cache.init_schema().await?;
    Ok(cache)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Drop the entry for `entity_id`. Returns whether one existed.
  pub async fn remove(&self, entity_id: &str) -> Result<bool> {
    let id = entity_id.to_owned();
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM person_cards WHERE entity_id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }

  /// Drop every entry. Returns the number removed.
  pub async fn clear(&self) -> Result<usize> {
    let removed = self
      .conn
      .call(|conn| Ok(conn.execute("DELETE FROM person_cards", [])?))
      .await?;
    Ok(removed)
  }
}

// ─── CardCache impl ──────────────────────────────────────────────────────────

impl CardCache for SqliteCardCache {
  type Error = crate::Error;

  async fn get(&self, entity_id: &str) -> Result<Option<CardState>> {
    let id = entity_id.to_owned();

    let raw: Option<RawCard> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT state_json, cached_at FROM person_cards WHERE entity_id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(RawCard {
                  state_json: row.get(0)?,
                  cached_at:  row.get(1)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCard::into_state).transpose()
  }

  async fn put(&self, entity_id: &str, state: &CardState) -> Result<()> {
    let id         = entity_id.to_owned();
    let cached_at  = encode_dt(state.time_cached.unwrap_or_else(Utc::now));
    let state_json = serde_json::to_string(state)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO person_cards (entity_id, state_json, cached_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT(entity_id) DO UPDATE SET
             state_json = excluded.state_json,
             cached_at  = excluded.cached_at",
          rusqlite::params![id, state_json, cached_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
