//! Card configuration: which sections to fetch and how long to trust the
//! cache.
//!
//! Passed explicitly into every fetch; nothing here is read from process
//! state.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default time a cached card stays fresh.
pub const DEFAULT_INVALIDATION_PERIOD: Duration = Duration::from_secs(60 * 60);

/// The organization section and its nested works-with toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationSection {
  pub enabled:         bool,
  /// Also list the people the entity works with.
  pub show_works_with: bool,
}

impl Default for OrganizationSection {
  fn default() -> Self { Self { enabled: true, show_works_with: true } }
}

/// Which optional card sections are enabled. All are on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionConfig {
  pub organization:  OrganizationSection,
  pub mail_messages: bool,
  pub files:         bool,
  pub profile:       bool,
}

impl Default for SectionConfig {
  fn default() -> Self {
    Self {
      organization:  OrganizationSection::default(),
      mail_messages: true,
      files:         true,
      profile:       true,
    }
  }
}

impl SectionConfig {
  /// Everything off; handy as a base when enabling sections one by one.
  pub fn none() -> Self {
    Self {
      organization:  OrganizationSection { enabled: false, show_works_with: false },
      mail_messages: false,
      files:         false,
      profile:       false,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
  pub enabled:             bool,
  pub invalidation_period: Duration,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self { enabled: true, invalidation_period: DEFAULT_INVALIDATION_PERIOD }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardConfig {
  pub sections: SectionConfig,
  pub cache:    CacheConfig,
}
