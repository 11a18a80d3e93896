//! Encoding and decoding between [`CardState`] and its SQLite row.
//!
//! Timestamps are stored as RFC 3339 strings; the state itself as compact
//! JSON. The `cached_at` column is authoritative for the cache timestamp.

use chrono::{DateTime, Utc};
use personcard_core::card::CardState;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row ─────────────────────────────────────────────────────────────────────

/// A `person_cards` row as read from SQLite, before decoding.
pub struct RawCard {
  pub state_json: String,
  pub cached_at:  String,
}

impl RawCard {
  pub fn into_state(self) -> Result<CardState> {
    let mut state: CardState = serde_json::from_str(&self.state_json)?;
    state.time_cached = Some(decode_dt(&self.cached_at)?);
    Ok(state)
  }
}
