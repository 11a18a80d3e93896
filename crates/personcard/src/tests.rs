//! Assembler tests against a recording in-process transport and an
//! in-memory SQLite cache.

use std::{collections::BTreeMap, sync::Mutex, time::Duration};

use chrono::{TimeDelta, Utc};
use personcard_cache_sqlite::SqliteCardCache;
use personcard_core::{
  cache::CardCache,
  card::{CardSection, CardSource, CardState, FailureReason},
  config::{CacheConfig, CardConfig, OrganizationSection, SectionConfig},
  entity::Entity,
  request::{ApiRequest, ApiVersion, Batch, BatchResponse, BatchResponses},
  transport::GraphTransport,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::{
  ChatMessageDraft, build_card_batch, create_chat, drop_disabled_direct_reports, fetch_card_data,
  send_message,
};

// ─── Fakes ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("fake transport: {0}")]
struct FakeError(String);

/// Records every call and answers from canned data.
struct FakeGraph {
  /// Replies keyed by section; only sections present in a batch are echoed.
  replies:    BTreeMap<CardSection, BatchResponse>,
  fail_batch: bool,
  /// `None` makes the profile call fail.
  profile:    Option<Value>,
  post_reply: Option<Value>,
  batches:    Mutex<Vec<Batch>>,
  gets:       Mutex<Vec<ApiRequest>>,
  posts:      Mutex<Vec<(ApiRequest, Value)>>,
}

impl FakeGraph {
  fn new() -> Self {
    Self {
      replies:    BTreeMap::new(),
      fail_batch: false,
      profile:    Some(json!({ "account": [{ "ageGroup": "adult" }] })),
      post_reply: None,
      batches:    Mutex::new(Vec::new()),
      gets:       Mutex::new(Vec::new()),
      posts:      Mutex::new(Vec::new()),
    }
  }

  /// Successful replies for every section a card can batch.
  fn with_directory_data() -> Self {
    let mut graph = Self::new();
    graph.reply(CardSection::Person, 200, json!({ "id": "u1", "displayName": "User One" }));
    graph.reply(
      CardSection::DirectReports,
      200,
      json!({ "value": [
        { "id": "r1", "accountEnabled": true },
        { "id": "r2", "accountEnabled": false },
        { "id": "r3" },
        { "id": "r4", "accountEnabled": true }
      ]}),
    );
    graph.reply(CardSection::People, 200, json!({ "value": [{ "id": "p1" }] }));
    graph.reply(CardSection::Messages, 200, json!({ "value": [{ "id": "m1" }] }));
    graph.reply(CardSection::Files, 200, json!({ "value": [{ "id": "f1" }] }));
    graph
  }

  fn reply(&mut self, section: CardSection, status: u16, body: Value) {
    self.replies.insert(section, BatchResponse { status, body });
  }

  fn network_calls(&self) -> usize {
    self.batches.lock().unwrap().len()
      + self.gets.lock().unwrap().len()
      + self.posts.lock().unwrap().len()
  }

  fn last_batch(&self) -> Batch {
    self.batches.lock().unwrap().last().cloned().expect("a batch was sent")
  }

  fn batched_names(&self) -> Vec<CardSection> {
    self.last_batch().names().collect()
  }

  fn profile_requested(&self) -> bool {
    self
      .gets
      .lock()
      .unwrap()
      .iter()
      .any(|r| r.path.ends_with("/profile"))
  }
}

impl GraphTransport for FakeGraph {
  type Error = FakeError;

  async fn execute_batch(&self, batch: &Batch) -> Result<BatchResponses, FakeError> {
    self.batches.lock().unwrap().push(batch.clone());
    if self.fail_batch {
      return Err(FakeError("connection reset".into()));
    }
    Ok(
      batch
        .names()
        .filter_map(|name| self.replies.get(&name).map(|r| (name, r.clone())))
        .collect(),
    )
  }

  async fn get<T>(&self, request: &ApiRequest) -> Result<T, FakeError>
  where
    T: DeserializeOwned + Send + 'static,
  {
    self.gets.lock().unwrap().push(request.clone());
    let value = self
      .profile
      .clone()
      .ok_or_else(|| FakeError("403 Forbidden".into()))?;
    serde_json::from_value(value).map_err(|e| FakeError(e.to_string()))
  }

  async fn post<B, T>(&self, request: &ApiRequest, body: &B) -> Result<T, FakeError>
  where
    B: Serialize + Sync + ?Sized,
    T: DeserializeOwned + Send + 'static,
  {
    let body = serde_json::to_value(body).map_err(|e| FakeError(e.to_string()))?;
    self.posts.lock().unwrap().push((request.clone(), body));
    let reply = self
      .post_reply
      .clone()
      .ok_or_else(|| FakeError("429 Too Many Requests".into()))?;
    serde_json::from_value(reply).map_err(|e| FakeError(e.to_string()))
  }
}

/// A cache whose every operation fails.
struct BrokenCache;

impl CardCache for BrokenCache {
  type Error = FakeError;

  async fn get(&self, _entity_id: &str) -> Result<Option<CardState>, FakeError> {
    Err(FakeError("disk I/O error".into()))
  }

  async fn put(&self, _entity_id: &str, _state: &CardState) -> Result<(), FakeError> {
    Err(FakeError("disk I/O error".into()))
  }
}

async fn cache() -> SqliteCardCache {
  SqliteCardCache::open_in_memory().await.expect("in-memory cache")
}

fn u1() -> Entity { Entity::user("u1", Some("u1@x.com".into())) }

fn all_sections() -> CardConfig { CardConfig::default() }

fn only(sections: SectionConfig) -> CardConfig {
  CardConfig { sections, cache: CacheConfig::default() }
}

// ─── Batch assembly ──────────────────────────────────────────────────────────

#[tokio::test]
async fn all_sections_for_another_user() {
  let graph = FakeGraph::with_directory_data();
  let cache = cache().await;

  let fetched = fetch_card_data(&graph, &cache, &u1(), false, &all_sections()).await;

  assert_eq!(
    graph.batched_names(),
    vec![
      CardSection::Person,
      CardSection::DirectReports,
      CardSection::People,
      CardSection::Messages,
      CardSection::Files,
    ]
  );
  let batch = graph.last_batch();
  assert_eq!(
    batch.request(CardSection::Messages).unwrap().path,
    "/me/messages?$search=\"from:u1@x.com\""
  );
  assert_eq!(
    batch.request(CardSection::Files).unwrap().path,
    "/me/insights/shared?$filter=lastshared/sharedby/address eq 'u1@x.com'"
  );

  assert_eq!(fetched.source, CardSource::Network);
  assert!(fetched.failures.is_empty(), "{:?}", fetched.failures);
  assert_eq!(fetched.state.people, Some(json!([{ "id": "p1" }])));
  assert_eq!(fetched.state.person.as_ref().unwrap()["displayName"], "User One");
  assert!(fetched.state.profile.is_some());

  let gets = graph.gets.lock().unwrap();
  assert_eq!(gets.len(), 1);
  assert_eq!(gets[0].path, "/users/u1/profile");
  assert_eq!(gets[0].version, ApiVersion::Beta);
  drop(gets);

  let cached = cache.get("u1").await.unwrap().expect("written back");
  assert!(cached.time_cached.is_some());
  assert_eq!(cached.people, fetched.state.people);
}

#[tokio::test]
async fn own_card_uses_recent_files() {
  let graph = FakeGraph::with_directory_data();
  fetch_card_data(&graph, &cache().await, &u1(), true, &all_sections()).await;

  let batch = graph.last_batch();
  assert_eq!(batch.request(CardSection::Files).unwrap().path, "/me/insights/used");
}

#[tokio::test]
async fn no_email_skips_mail_and_uses_recent_files() {
  let graph = FakeGraph::with_directory_data();
  let entity = Entity::user("u1", None);
  fetch_card_data(&graph, &cache().await, &entity, false, &all_sections()).await;

  let batch = graph.last_batch();
  assert!(batch.request(CardSection::Messages).is_none());
  assert_eq!(batch.request(CardSection::Files).unwrap().path, "/me/insights/used");
}

#[tokio::test]
async fn contacts_never_request_org_structure_or_profile() {
  let graph = FakeGraph::with_directory_data();
  let contact = Entity::from_graph(&json!({
    "id": "c1",
    "personType": { "class": "Person", "subclass": "PersonalContact" },
    "scoredEmailAddresses": [{ "address": "c1@x.com" }]
  }))
  .unwrap();

  let fetched = fetch_card_data(&graph, &cache().await, &contact, false, &all_sections()).await;

  assert_eq!(graph.batched_names(), vec![CardSection::Messages, CardSection::Files]);
  assert!(!graph.profile_requested());
  assert!(fetched.state.person.is_none());
  assert!(fetched.state.profile.is_none());
}

#[tokio::test]
async fn groups_never_request_org_structure_or_profile() {
  let graph = FakeGraph::with_directory_data();
  let group = Entity::from_graph(&json!({
    "id": "g1",
    "classification": "internal",
    "mail": "team@x.com"
  }))
  .unwrap();

  fetch_card_data(&graph, &cache().await, &group, false, &all_sections()).await;

  let names = graph.batched_names();
  assert!(!names.contains(&CardSection::Person));
  assert!(!names.contains(&CardSection::DirectReports));
  assert!(!names.contains(&CardSection::People));
  assert!(!graph.profile_requested());
}

#[tokio::test]
async fn organization_without_works_with() {
  let graph = FakeGraph::with_directory_data();
  let mut sections = SectionConfig::none();
  sections.organization = OrganizationSection { enabled: true, show_works_with: false };

  fetch_card_data(&graph, &cache().await, &u1(), false, &only(sections)).await;

  assert_eq!(graph.batched_names(), vec![CardSection::Person, CardSection::DirectReports]);
  assert!(!graph.profile_requested());
}

#[tokio::test]
async fn nothing_enabled_makes_no_calls() {
  let graph = FakeGraph::with_directory_data();
  let cache = cache().await;

  let fetched = fetch_card_data(&graph, &cache, &u1(), false, &only(SectionConfig::none())).await;

  assert_eq!(graph.network_calls(), 0);
  assert!(fetched.state.is_empty());
  assert!(cache.get("u1").await.unwrap().is_some());
}

// ─── Cache ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fresh_cache_entry_is_returned_without_network() {
  let graph = FakeGraph::with_directory_data();
  let cache = cache().await;

  let mut cached = CardState::default();
  cached.set(CardSection::Person, json!({ "id": "u1", "displayName": "Cached" }));
  cached.time_cached = Some(Utc::now() - TimeDelta::minutes(5));
  cache.put("u1", &cached).await.unwrap();

  let fetched = fetch_card_data(&graph, &cache, &u1(), false, &all_sections()).await;

  assert_eq!(graph.network_calls(), 0);
  assert_eq!(fetched.source, CardSource::Cache);
  assert_eq!(fetched.state.person, cached.person);
  assert_eq!(fetched.state.time_cached, cached.time_cached);
}

#[tokio::test]
async fn stale_cache_entry_is_refetched_and_overwritten() {
  let graph = FakeGraph::with_directory_data();
  let cache = cache().await;

  let mut cached = CardState::default();
  cached.set(CardSection::Person, json!({ "id": "u1", "displayName": "Stale" }));
  let stale_at = Utc::now() - TimeDelta::hours(2);
  cached.time_cached = Some(stale_at);
  cache.put("u1", &cached).await.unwrap();

  let fetched = fetch_card_data(&graph, &cache, &u1(), false, &all_sections()).await;

  assert_eq!(fetched.source, CardSource::Network);
  assert_eq!(fetched.state.person.as_ref().unwrap()["displayName"], "User One");

  let rewritten = cache.get("u1").await.unwrap().unwrap();
  assert!(rewritten.time_cached.unwrap() > stale_at);
  assert_eq!(rewritten.person.unwrap()["displayName"], "User One");
}

#[tokio::test]
async fn short_invalidation_period_forces_refetch() {
  let graph = FakeGraph::with_directory_data();
  let cache = cache().await;
  let mut config = all_sections();
  config.cache.invalidation_period = Duration::ZERO;

  fetch_card_data(&graph, &cache, &u1(), false, &config).await;
  fetch_card_data(&graph, &cache, &u1(), false, &config).await;

  assert_eq!(graph.batches.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn disabled_cache_is_neither_read_nor_written() {
  let graph = FakeGraph::with_directory_data();
  let cache = cache().await;

  let mut cached = CardState::default();
  cached.time_cached = Some(Utc::now());
  cache.put("other", &cached).await.unwrap();

  let mut config = all_sections();
  config.cache.enabled = false;
  let fetched = fetch_card_data(&graph, &cache, &u1(), false, &config).await;

  assert_eq!(fetched.source, CardSource::Network);
  assert!(fetched.state.time_cached.is_none());
  assert!(cache.get("u1").await.unwrap().is_none());
}

#[tokio::test]
async fn broken_cache_does_not_fail_the_fetch() {
  let graph = FakeGraph::with_directory_data();

  let fetched = fetch_card_data(&graph, &BrokenCache, &u1(), false, &all_sections()).await;

  assert_eq!(fetched.source, CardSource::Network);
  assert!(fetched.state.person.is_some());
  assert!(fetched.failures.is_empty());
}

// ─── Merge and failures ──────────────────────────────────────────────────────

#[tokio::test]
async fn disabled_direct_reports_are_dropped() {
  let graph = FakeGraph::with_directory_data();
  let cache = cache().await;

  let fetched = fetch_card_data(&graph, &cache, &u1(), false, &all_sections()).await;

  let expected = json!([
    { "id": "r1", "accountEnabled": true },
    { "id": "r4", "accountEnabled": true }
  ]);
  assert_eq!(fetched.state.direct_reports, Some(expected.clone()));
  assert_eq!(cache.get("u1").await.unwrap().unwrap().direct_reports, Some(expected));
}

#[tokio::test]
async fn batch_failure_still_resolves_and_is_flagged() {
  let mut graph = FakeGraph::with_directory_data();
  graph.fail_batch = true;
  let cache = cache().await;

  let fetched = fetch_card_data(&graph, &cache, &u1(), false, &all_sections()).await;

  assert_eq!(fetched.source, CardSource::Network);
  assert!(fetched.state.person.is_none());
  assert!(fetched.state.files.is_none());
  assert!(fetched.state.profile.is_some(), "profile is fetched separately");

  let failed: Vec<_> = fetched.failures.iter().map(|f| f.section).collect();
  assert_eq!(
    failed,
    vec![
      CardSection::Person,
      CardSection::DirectReports,
      CardSection::People,
      CardSection::Messages,
      CardSection::Files,
    ]
  );
  assert!(
    fetched
      .failures
      .iter()
      .all(|f| matches!(&f.reason, FailureReason::Transport(m) if m.contains("connection reset")))
  );
  assert!(cache.get("u1").await.unwrap().is_some());
}

#[tokio::test]
async fn batch_and_profile_failure_yield_an_empty_card() {
  let mut graph = FakeGraph::with_directory_data();
  graph.fail_batch = true;
  graph.profile = None;

  let fetched = fetch_card_data(&graph, &cache().await, &u1(), false, &all_sections()).await;

  assert!(fetched.state.is_empty());
  assert!(fetched.failed(CardSection::Profile));
  assert_eq!(fetched.failures.len(), 6);
}

#[tokio::test]
async fn profile_failure_keeps_other_sections() {
  let mut graph = FakeGraph::with_directory_data();
  graph.profile = None;

  let fetched = fetch_card_data(&graph, &cache().await, &u1(), false, &all_sections()).await;

  assert!(fetched.state.profile.is_none());
  assert!(fetched.state.person.is_some());
  assert!(fetched.state.direct_reports.is_some());
  assert!(fetched.state.people.is_some());
  assert!(fetched.state.messages.is_some());
  assert!(fetched.state.files.is_some());
  assert_eq!(fetched.failures.len(), 1);
  assert!(fetched.failed(CardSection::Profile));

  let serialised = serde_json::to_value(&fetched.state).unwrap();
  assert!(serialised.get("profile").is_none());
}

#[tokio::test]
async fn failed_sub_request_is_flagged_by_status() {
  let mut graph = FakeGraph::with_directory_data();
  graph.reply(
    CardSection::Messages,
    403,
    json!({ "error": { "code": "ErrorAccessDenied" } }),
  );

  let fetched = fetch_card_data(&graph, &cache().await, &u1(), false, &all_sections()).await;

  assert!(fetched.state.messages.is_none());
  assert!(fetched.state.files.is_some());
  assert_eq!(fetched.failures.len(), 1);
  assert_eq!(fetched.failures[0].section, CardSection::Messages);
  assert_eq!(fetched.failures[0].reason, FailureReason::Status(403));
}

#[test]
fn batch_and_report_filter_are_usable_on_their_own() {
  let batch = build_card_batch(&u1(), true, &SectionConfig::default());
  assert_eq!(batch.len(), 5);
  assert_eq!(batch.request(CardSection::Files).unwrap().path, "/me/insights/used");

  let mut state = CardState {
    direct_reports: Some(json!([
      { "id": "r1", "accountEnabled": true },
      { "id": "r2", "accountEnabled": "true" }
    ])),
    ..CardState::default()
  };
  drop_disabled_direct_reports(&mut state);
  assert_eq!(state.direct_reports, Some(json!([{ "id": "r1", "accountEnabled": true }])));
}

#[tokio::test]
async fn unanswered_sub_request_is_flagged_missing() {
  let mut graph = FakeGraph::with_directory_data();
  graph.replies.remove(&CardSection::Files);

  let fetched = fetch_card_data(&graph, &cache().await, &u1(), false, &all_sections()).await;

  assert!(fetched.state.files.is_none());
  assert!(fetched.state.messages.is_some());
  assert!(fetched.failed(CardSection::Files));
  assert_eq!(fetched.failures.len(), 1);
  assert_eq!(fetched.failures[0].reason, FailureReason::Missing);
}

#[tokio::test]
async fn single_object_payload_is_stored_whole() {
  let graph = FakeGraph::with_directory_data();
  let fetched = fetch_card_data(&graph, &cache().await, &u1(), false, &all_sections()).await;
  assert_eq!(
    fetched.state.person,
    Some(json!({ "id": "u1", "displayName": "User One" }))
  );
}

// ─── Chat ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_chat_binds_user_then_person_as_owners() {
  let mut graph = FakeGraph::new();
  graph.post_reply = Some(json!({ "id": "19:chat", "chatType": "oneOnOne" }));

  let chat = create_chat(&graph, "personId", "userId").await.unwrap();
  assert_eq!(chat.id, "19:chat");
  assert_eq!(chat.chat_type.as_deref(), Some("oneOnOne"));

  let posts = graph.posts.lock().unwrap();
  let (request, body) = &posts[0];
  assert_eq!(request.path, "/chats");
  assert_eq!(request.version, ApiVersion::V1);
  assert!(request.headers.contains(&("Cache-Control".into(), "no-store".into())));
  assert_eq!(request.scopes, vec!["Chat.Create", "Chat.ReadWrite"]);

  assert_eq!(body["chatType"], "oneOnOne");
  let members = body["members"].as_array().unwrap();
  assert_eq!(members.len(), 2);
  assert_eq!(
    members[0]["user@odata.bind"],
    "https://graph.microsoft.com/v1.0/users('userId')"
  );
  assert_eq!(
    members[1]["user@odata.bind"],
    "https://graph.microsoft.com/v1.0/users('personId')"
  );
  for member in members {
    assert_eq!(member["roles"], json!(["owner"]));
    assert_eq!(member["@odata.type"], "#microsoft.graph.aadUserConversationMember");
  }
}

#[tokio::test]
async fn send_message_posts_to_chat_messages() {
  let mut graph = FakeGraph::new();
  graph.post_reply = Some(json!({
    "id": "m1",
    "chatId": "19:chat",
    "body": { "content": "hello", "contentType": "text" }
  }));

  let message = send_message(&graph, "19:chat", &ChatMessageDraft::text("hello"))
    .await
    .unwrap();
  assert_eq!(message.id, "m1");
  assert_eq!(message.body.unwrap().content, "hello");

  let posts = graph.posts.lock().unwrap();
  let (request, body) = &posts[0];
  assert_eq!(request.path, "/chats/19:chat/messages");
  assert!(request.headers.contains(&("Cache-Control".into(), "no-store".into())));
  assert_eq!(request.scopes, vec!["ChatMessage.Send", "Chat.ReadWrite"]);
  assert_eq!(body, &json!({ "body": { "content": "hello" } }));
}

#[tokio::test]
async fn chat_failures_propagate() {
  let graph = FakeGraph::new();

  let err = create_chat(&graph, "personId", "userId").await.unwrap_err();
  assert!(err.to_string().contains("429"));

  let err = send_message(&graph, "19:chat", &ChatMessageDraft::html("<b>hi</b>"))
    .await
    .unwrap_err();
  assert!(err.to_string().contains("429"));
  assert_eq!(
    graph.posts.lock().unwrap()[1].1,
    json!({ "body": { "content": "<b>hi</b>", "contentType": "html" } })
  );
}
