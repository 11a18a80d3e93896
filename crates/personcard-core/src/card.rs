//! Card state: the accumulated record handed to the person card widget.
//!
//! Payloads are opaque JSON straight from the directory API; only the
//! section keys and the cache timestamp are known here.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Sections ────────────────────────────────────────────────────────────────

/// The fixed set of record keys. The wire name doubles as the batch
/// request id, so each section is requested at most once per fetch.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::IntoStaticStr,
  strum::EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum CardSection {
  Person,
  DirectReports,
  People,
  Messages,
  Files,
  Profile,
}

impl CardSection {
  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── State ───────────────────────────────────────────────────────────────────

/// Person card data keyed by section name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardState {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub person:         Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub direct_reports: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub people:         Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub messages:       Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub files:          Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub profile:        Option<Value>,
  /// Set when the state is written to the cache.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub time_cached:    Option<DateTime<Utc>>,
}

impl CardState {
  fn slot_mut(&mut self, section: CardSection) -> &mut Option<Value> {
    match section {
      CardSection::Person => &mut self.person,
      CardSection::DirectReports => &mut self.direct_reports,
      CardSection::People => &mut self.people,
      CardSection::Messages => &mut self.messages,
      CardSection::Files => &mut self.files,
      CardSection::Profile => &mut self.profile,
    }
  }

  pub fn get(&self, section: CardSection) -> Option<&Value> {
    match section {
      CardSection::Person => self.person.as_ref(),
      CardSection::DirectReports => self.direct_reports.as_ref(),
      CardSection::People => self.people.as_ref(),
      CardSection::Messages => self.messages.as_ref(),
      CardSection::Files => self.files.as_ref(),
      CardSection::Profile => self.profile.as_ref(),
    }
  }

  pub fn set(&mut self, section: CardSection, value: Value) {
    *self.slot_mut(section) = Some(value);
  }

  /// True when no section holds data.
  pub fn is_empty(&self) -> bool {
    use strum::IntoEnumIterator as _;
    CardSection::iter().all(|s| self.get(s).is_none())
  }

  /// Fresh means cached less than `period` before `now`. A state that was
  /// never cached is never fresh.
  pub fn is_fresh(&self, now: DateTime<Utc>, period: Duration) -> bool {
    let Some(cached_at) = self.time_cached else {
      return false;
    };
    let period = TimeDelta::from_std(period).unwrap_or(TimeDelta::MAX);
    now.signed_duration_since(cached_at) < period
  }
}

// ─── Fetch outcome ───────────────────────────────────────────────────────────

/// Why a section is missing from a fetched card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
  /// The call never produced a response (network, auth, decoding).
  Transport(String),
  /// The sub-request came back with a non-success status.
  Status(u16),
  /// The batch reply had no entry for the sub-request.
  Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionFailure {
  pub section: CardSection,
  pub reason:  FailureReason,
}

/// Where the returned state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSource {
  Cache,
  Network,
}

/// The result of a card fetch: whatever data could be obtained, plus the
/// sections that could not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardFetch {
  pub state:    CardState,
  pub source:   CardSource,
  pub failures: Vec<SectionFailure>,
}

impl CardFetch {
  pub fn failed(&self, section: CardSection) -> bool {
    self.failures.iter().any(|f| f.section == section)
  }
}
