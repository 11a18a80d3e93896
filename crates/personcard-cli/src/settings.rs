//! Runtime settings, layered from an optional TOML file and `PERSONCARD_*`
//! environment variables.
//!
//! ```toml
//! access_token = "eyJ0eXAi..."
//! cache_path = "~/.cache/personcard/cards.sqlite3"
//! invalidation_period_secs = 3600
//!
//! [sections]
//! mail_messages = false
//!
//! [sections.organization]
//! show_works_with = false
//! ```
//!
//! Nested keys use `__` in the environment, e.g. `PERSONCARD_SECTIONS__FILES=false`.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use config::{ConfigBuilder, builder::DefaultState};
use personcard_core::config::{
  CacheConfig, CardConfig, DEFAULT_INVALIDATION_PERIOD, SectionConfig,
};
use personcard_graph::client::DEFAULT_GRAPH_BASE_URL;
use serde::Deserialize;

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct Settings {
  pub graph_base_url:           String,
  pub access_token:             String,
  pub cache_path:               PathBuf,
  pub cache_enabled:            bool,
  pub invalidation_period_secs: u64,
  pub sections:                 SectionConfig,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      graph_base_url:           DEFAULT_GRAPH_BASE_URL.to_string(),
      access_token:             String::new(),
      cache_path:               PathBuf::from("~/.cache/personcard/cards.sqlite3"),
      cache_enabled:            true,
      invalidation_period_secs: DEFAULT_INVALIDATION_PERIOD.as_secs(),
      sections:                 SectionConfig::default(),
    }
  }
}

impl Settings {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::from_builder(
      config::Config::builder()
        .add_source(config::File::from(path.to_path_buf()).required(false))
        .add_source(
          config::Environment::with_prefix("PERSONCARD")
            .prefix_separator("_")
            .separator("__"),
        ),
    )
  }

  fn from_builder(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
    builder
      .build()
      .context("failed to read settings")?
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  pub fn card_config(&self) -> CardConfig {
    CardConfig {
      sections: self.sections,
      cache:    CacheConfig {
        enabled:             self.cache_enabled,
        invalidation_period: Duration::from_secs(self.invalidation_period_secs),
      },
    }
  }

  /// The cache location with a leading `~` expanded.
  pub fn cache_path(&self) -> PathBuf { expand_tilde(&self.cache_path) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
