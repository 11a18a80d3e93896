//! The card fetch: cache lookup, batch, profile, filter, cache write.
//!
//! Every remote step is best-effort. Whatever could not be fetched is
//! reported in [`CardFetch::failures`]; nothing is returned as an error.

use chrono::Utc;
use personcard_core::{
  cache::CardCache,
  card::{CardFetch, CardSection, CardSource, CardState, FailureReason, SectionFailure},
  config::{CardConfig, SectionConfig},
  entity::Entity,
  request::Batch,
  transport::GraphTransport,
};
use serde_json::Value;

use crate::{
  profile::get_profile,
  requests::{
    build_files_request, build_mail_request, build_org_structure_request,
    build_works_with_request,
  },
};

/// Assemble person card data for `entity`.
///
/// A fresh cache entry is returned as-is without touching the network.
/// Otherwise the enabled sections are fetched, disabled direct reports are
/// dropped, and the result is written back under the entity id.
pub async fn fetch_card_data<G, C>(
  graph: &G,
  cache: &C,
  entity: &Entity,
  is_me: bool,
  config: &CardConfig,
) -> CardFetch
where
  G: GraphTransport,
  C: CardCache,
{
  let now = Utc::now();

  if config.cache.enabled {
    match cache.get(&entity.id).await {
      Ok(Some(state)) if state.is_fresh(now, config.cache.invalidation_period) => {
        tracing::debug!(entity_id = %entity.id, "person card cache hit");
        return CardFetch { state, source: CardSource::Cache, failures: Vec::new() };
      }
      Ok(_) => tracing::debug!(entity_id = %entity.id, "person card cache miss"),
      Err(e) => {
        tracing::warn!(entity_id = %entity.id, error = %e, "person card cache read failed");
      }
    }
  }

  let mut state = CardState::default();
  let mut failures = Vec::new();

  let batch = build_card_batch(entity, is_me, &config.sections);
  if !batch.is_empty() {
    tracing::debug!(entity_id = %entity.id, requests = batch.len(), "executing card batch");
    match graph.execute_batch(&batch).await {
      Ok(responses) => {
        for section in batch.names().filter(|s| !responses.contains_key(s)) {
          tracing::warn!(entity_id = %entity.id, %section, "card batch reply missing entry");
          failures.push(SectionFailure { section, reason: FailureReason::Missing });
        }
        for (section, response) in responses {
          if response.is_success() {
            state.set(section, response.into_payload());
          } else {
            tracing::warn!(
              entity_id = %entity.id,
              %section,
              status = response.status,
              "card batch request failed"
            );
            failures.push(SectionFailure {
              section,
              reason: FailureReason::Status(response.status),
            });
          }
        }
      }
      Err(e) => {
        tracing::warn!(entity_id = %entity.id, error = %e, "card batch failed");
        let reason = FailureReason::Transport(e.to_string());
        failures.extend(batch.names().map(|section| SectionFailure {
          section,
          reason: reason.clone(),
        }));
      }
    }
  }

  if entity.kind.has_org_data() && config.sections.profile {
    match get_profile(graph, &entity.id).await {
      Ok(profile) if !profile.is_null() => state.set(CardSection::Profile, profile),
      Ok(_) => {}
      Err(e) => {
        tracing::warn!(entity_id = %entity.id, error = %e, "profile fetch failed");
        failures.push(SectionFailure {
          section: CardSection::Profile,
          reason:  FailureReason::Transport(e.to_string()),
        });
      }
    }
  }

  drop_disabled_direct_reports(&mut state);

  if config.cache.enabled {
    state.time_cached = Some(now);
    if let Err(e) = cache.put(&entity.id, &state).await {
      tracing::warn!(entity_id = %entity.id, error = %e, "person card cache write failed");
    }
  }

  CardFetch { state, source: CardSource::Network, failures }
}

/// The batch for one card, given the entity kind and enabled sections.
///
/// Contacts and groups have no org chart; files fall back to the signed-in
/// user's own recent files when the card is theirs or no address is known.
pub fn build_card_batch(entity: &Entity, is_me: bool, sections: &SectionConfig) -> Batch {
  let mut batch = Batch::new();
  let email = entity.email();

  if entity.kind.has_org_data() && sections.organization.enabled {
    build_org_structure_request(&mut batch, &entity.id);
    if sections.organization.show_works_with {
      build_works_with_request(&mut batch, &entity.id);
    }
  }

  if sections.mail_messages
    && let Some(email) = email.as_deref()
  {
    build_mail_request(&mut batch, email);
  }

  if sections.files {
    let shared_by = if is_me { None } else { email.as_deref() };
    build_files_request(&mut batch, shared_by);
  }

  batch
}

/// Keep only direct reports whose `accountEnabled` is `true`.
pub fn drop_disabled_direct_reports(state: &mut CardState) {
  if let Some(Value::Array(reports)) = state.direct_reports.as_mut() {
    reports.retain(|r| r.get("accountEnabled").and_then(Value::as_bool) == Some(true));
  }
}
