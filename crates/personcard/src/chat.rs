//! One-on-one chat calls offered from the card.
//!
//! Both are user-initiated, so failures are returned to the caller
//! untouched. Neither is batched nor cached.

use chrono::{DateTime, Utc};
use personcard_core::{
  request::ApiRequest,
  scopes::{CHAT_CREATE_SCOPES, CHAT_MESSAGE_SCOPES},
  transport::GraphTransport,
};
use serde::{Deserialize, Serialize};

/// Absolute root used in `user@odata.bind` references.
const GRAPH_USERS_BIND_ROOT: &str = "https://graph.microsoft.com/v1.0/users";

const CONVERSATION_MEMBER_TYPE: &str = "#microsoft.graph.aadUserConversationMember";

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ChatMember {
  #[serde(rename = "@odata.type")]
  odata_type: &'static str,
  roles:      Vec<&'static str>,
  #[serde(rename = "user@odata.bind")]
  user_bind:  String,
}

impl ChatMember {
  fn owner(user_id: &str) -> Self {
    Self {
      odata_type: CONVERSATION_MEMBER_TYPE,
      roles:      vec!["owner"],
      user_bind:  format!("{GRAPH_USERS_BIND_ROOT}('{user_id}')"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewChat {
  chat_type: &'static str,
  members:   Vec<ChatMember>,
}

impl NewChat {
  /// The signed-in user first, then the card's person; both owners.
  pub(crate) fn one_on_one(person_id: &str, user_id: &str) -> Self {
    Self {
      chat_type: "oneOnOne",
      members:   vec![ChatMember::owner(user_id), ChatMember::owner(person_id)],
    }
  }
}

/// Message body content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
  pub content:      String,
  /// `text` or `html`; the service assumes `text` when absent.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub content_type: Option<String>,
}

/// A message to post into a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageDraft {
  pub body: ItemBody,
}

impl ChatMessageDraft {
  pub fn text(content: impl Into<String>) -> Self {
    Self { body: ItemBody { content: content.into(), content_type: None } }
  }

  pub fn html(content: impl Into<String>) -> Self {
    Self {
      body: ItemBody {
        content:      content.into(),
        content_type: Some("html".to_string()),
      },
    }
  }
}

/// A chat resource as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
  pub id:                String,
  #[serde(default)]
  pub chat_type:         Option<String>,
  #[serde(default)]
  pub topic:             Option<String>,
  #[serde(default)]
  pub web_url:           Option<String>,
  #[serde(default)]
  pub created_date_time: Option<DateTime<Utc>>,
}

/// A chat message resource as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
  pub id:                String,
  #[serde(default)]
  pub chat_id:           Option<String>,
  #[serde(default)]
  pub created_date_time: Option<DateTime<Utc>>,
  #[serde(default)]
  pub body:              Option<ItemBody>,
}

// ─── Calls ───────────────────────────────────────────────────────────────────

/// Create a one-on-one chat between the signed-in `user_id` and `person_id`.
pub async fn create_chat<G: GraphTransport>(
  graph: &G,
  person_id: &str,
  user_id: &str,
) -> Result<Chat, G::Error> {
  let request = ApiRequest::new("/chats")
    .header("Cache-Control", "no-store")
    .scopes(CHAT_CREATE_SCOPES);
  graph
    .post(&request, &NewChat::one_on_one(person_id, user_id))
    .await
}

/// Post `message` into the chat `chat_id`.
pub async fn send_message<G: GraphTransport>(
  graph: &G,
  chat_id: &str,
  message: &ChatMessageDraft,
) -> Result<ChatMessage, G::Error> {
  let request = ApiRequest::new(format!("/chats/{chat_id}/messages"))
    .header("Cache-Control", "no-store")
    .scopes(CHAT_MESSAGE_SCOPES);
  graph.post(&request, message).await
}
