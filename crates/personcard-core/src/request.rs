//! Request descriptors: single API calls and named batch entries.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::card::CardSection;

// ─── Single calls ────────────────────────────────────────────────────────────

/// Versioned API root a path is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiVersion {
  #[default]
  V1,
  Beta,
}

impl ApiVersion {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::V1 => "v1.0",
      Self::Beta => "beta",
    }
  }
}

/// A single authenticated call, built fluently:
///
/// ```rust,ignore
/// ApiRequest::new("/users/u1/profile")
///   .version(ApiVersion::Beta)
///   .scopes(PROFILE_SCOPES);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiRequest {
  pub path:    String,
  pub version: ApiVersion,
  pub headers: Vec<(String, String)>,
  pub scopes:  Vec<String>,
}

impl ApiRequest {
  pub fn new(path: impl Into<String>) -> Self {
    Self { path: path.into(), ..Self::default() }
  }

  pub fn version(mut self, version: ApiVersion) -> Self {
    self.version = version;
    self
  }

  pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.headers.push((name.into(), value.into()));
    self
  }

  pub fn scopes(mut self, scopes: &[&str]) -> Self {
    self.scopes.extend(scopes.iter().map(|s| (*s).to_owned()));
    self
  }
}

// ─── Batches ─────────────────────────────────────────────────────────────────

/// One named GET inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
  pub name:    CardSection,
  /// Resource path relative to the batch's API version, with query string.
  pub path:    String,
  pub scopes:  Vec<String>,
  pub headers: Vec<(String, String)>,
}

/// Named requests collected before a single round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
  requests: Vec<BatchRequest>,
}

impl Batch {
  pub fn new() -> Self { Self::default() }

  /// Register a GET under `name`. A second registration under the same name
  /// replaces the first.
  pub fn get(
    &mut self,
    name: CardSection,
    path: impl Into<String>,
    scopes: &[&str],
    headers: &[(&str, &str)],
  ) -> &mut Self {
    self.requests.retain(|r| r.name != name);
    self.requests.push(BatchRequest {
      name,
      path: path.into(),
      scopes: scopes.iter().map(|s| (*s).to_owned()).collect(),
      headers: headers
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect(),
    });
    self
  }

  pub fn is_empty(&self) -> bool { self.requests.is_empty() }

  pub fn len(&self) -> usize { self.requests.len() }

  pub fn requests(&self) -> &[BatchRequest] { &self.requests }

  pub fn request(&self, name: CardSection) -> Option<&BatchRequest> {
    self.requests.iter().find(|r| r.name == name)
  }

  pub fn names(&self) -> impl Iterator<Item = CardSection> + '_ {
    self.requests.iter().map(|r| r.name)
  }

  /// Union of all request scopes, first-seen order, without duplicates.
  pub fn scopes(&self) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for scope in self.requests.iter().flat_map(|r| r.scopes.iter()) {
      if !out.contains(scope) {
        out.push(scope.clone());
      }
    }
    out
  }
}

/// The response to one named batch entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResponse {
  pub status: u16,
  pub body:   Value,
}

impl BatchResponse {
  pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }

  /// The primary payload: the collection `value` member when present and
  /// non-null, otherwise the whole body.
  pub fn into_payload(self) -> Value {
    match self.body {
      Value::Object(mut map) => match map.remove("value") {
        Some(value) if !value.is_null() => value,
        Some(value) => {
          map.insert("value".to_owned(), value);
          Value::Object(map)
        }
        None => Value::Object(map),
      },
      other => other,
    }
  }
}

pub type BatchResponses = BTreeMap<CardSection, BatchResponse>;
