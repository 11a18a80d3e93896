//! The directory object a person card is rendered for.
//!
//! Graph hands back users, personal contacts and groups through the same
//! people-ish endpoints. They are told apart by probing a couple of fields;
//! that probing happens once, here, and the result is carried as an
//! [`EntityKind`] from then on.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

// ─── Classification ──────────────────────────────────────────────────────────

/// The closed set of directory entities a card can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
  #[default]
  User,
  PersonalContact,
  Group,
}

impl EntityKind {
  /// Classify a raw Graph object.
  ///
  /// A `classification` member marks a unified group. Otherwise the
  /// `personType` descriptor returned by the people API decides.
  pub fn classify(raw: &Value) -> Self {
    if raw.get("classification").is_some() {
      return Self::Group;
    }
    let Some(person_type) = raw.get("personType") else {
      return Self::User;
    };
    if person_type.get("class").and_then(Value::as_str) == Some("Group") {
      Self::Group
    } else if person_type.get("subclass").and_then(Value::as_str)
      == Some("PersonalContact")
    {
      Self::PersonalContact
    } else {
      Self::User
    }
  }

  /// Whether the directory holds org-chart and profile data for this kind.
  pub fn has_org_data(self) -> bool {
    match self {
      Self::User => true,
      Self::PersonalContact | Self::Group => false,
    }
  }
}

// ─── Entity ──────────────────────────────────────────────────────────────────

/// One address entry of `emailAddresses` / `scoredEmailAddresses`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAddress {
  #[serde(default)]
  pub address: Option<String>,
  #[serde(default)]
  pub name:    Option<String>,
}

/// A directory entity reference: id, kind, and whatever address fields the
/// source object carried.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
  pub id:                     String,
  #[serde(default)]
  pub kind:                   EntityKind,
  #[serde(default)]
  pub mail:                   Option<String>,
  #[serde(default)]
  pub user_principal_name:    Option<String>,
  #[serde(default)]
  pub scored_email_addresses: Vec<EmailAddress>,
  #[serde(default)]
  pub email_addresses:        Vec<EmailAddress>,
}

/// The subset of a Graph object we read, before classification.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntity {
  #[serde(default)]
  id:                     Option<String>,
  #[serde(default)]
  mail:                   Option<String>,
  #[serde(default)]
  user_principal_name:    Option<String>,
  #[serde(default)]
  scored_email_addresses: Option<Vec<EmailAddress>>,
  #[serde(default)]
  email_addresses:        Option<Vec<EmailAddress>>,
}

impl Entity {
  /// A plain directory user.
  pub fn user(id: impl Into<String>, mail: Option<String>) -> Self {
    Self { id: id.into(), kind: EntityKind::User, mail, ..Self::default() }
  }

  /// Build an entity from a raw Graph user, person, contact or group object.
  pub fn from_graph(raw: &Value) -> Result<Self> {
    let kind = EntityKind::classify(raw);
    let parsed: RawEntity = serde_json::from_value(raw.clone())?;
    let id = parsed
      .id
      .filter(|id| !id.is_empty())
      .ok_or(Error::MissingId)?;

    Ok(Self {
      id,
      kind,
      mail: parsed.mail,
      user_principal_name: parsed.user_principal_name,
      scored_email_addresses: parsed.scored_email_addresses.unwrap_or_default(),
      email_addresses: parsed.email_addresses.unwrap_or_default(),
    })
  }

  /// The best email address for this entity, if any.
  ///
  /// `mail` wins, then the highest-scored address, then the first plain
  /// address entry. `userPrincipalName` is not an address and is ignored.
  pub fn email(&self) -> Option<String> {
    let first_address = |list: &[EmailAddress]| {
      list.first().and_then(|e| e.address.as_deref()).map(str::to_owned)
    };

    self
      .mail
      .clone()
      .and_then(non_empty_address)
      .or_else(|| {
        first_address(&self.scored_email_addresses).and_then(non_empty_address)
      })
      .or_else(|| first_address(&self.email_addresses).and_then(non_empty_address))
  }
}

/// Reduce `Display Name <addr@host>` to `addr@host`; `None` when blank.
fn non_empty_address(raw: String) -> Option<String> {
  let trimmed = raw.trim();
  let bare = match (trimmed.find('<'), trimmed.rfind('>')) {
    (Some(open), Some(close)) if open < close => trimmed[open + 1..close].trim(),
    _ => trimmed,
  };
  (!bare.is_empty()).then(|| bare.to_owned())
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn classification_member_means_group() {
    let raw = json!({ "id": "g1", "classification": null });
    assert_eq!(EntityKind::classify(&raw), EntityKind::Group);
  }

  #[test]
  fn person_type_decides_contact_and_group() {
    let contact = json!({
      "id": "c1",
      "personType": { "class": "Person", "subclass": "PersonalContact" }
    });
    let group = json!({
      "id": "g1",
      "personType": { "class": "Group", "subclass": "UnifiedGroup" }
    });
    let user = json!({
      "id": "u1",
      "personType": { "class": "Person", "subclass": "OrganizationUser" }
    });

    assert_eq!(EntityKind::classify(&contact), EntityKind::PersonalContact);
    assert_eq!(EntityKind::classify(&group), EntityKind::Group);
    assert_eq!(EntityKind::classify(&user), EntityKind::User);
    assert_eq!(EntityKind::classify(&json!({ "id": "u2" })), EntityKind::User);
  }

  #[test]
  fn only_users_have_org_data() {
    assert!(EntityKind::User.has_org_data());
    assert!(!EntityKind::PersonalContact.has_org_data());
    assert!(!EntityKind::Group.has_org_data());
  }

  #[test]
  fn from_graph_requires_an_id() {
    let err = Entity::from_graph(&json!({ "mail": "a@x.com" })).unwrap_err();
    assert!(matches!(err, Error::MissingId));
  }

  #[test]
  fn email_prefers_mail_then_scored_then_plain() {
    let entity = Entity::from_graph(&json!({
      "id": "p1",
      "scoredEmailAddresses": [{ "address": "scored@x.com", "relevanceScore": 8.0 }],
      "emailAddresses": [{ "address": "plain@x.com" }]
    }))
    .unwrap();
    assert_eq!(entity.email().as_deref(), Some("scored@x.com"));

    let entity = Entity::from_graph(&json!({
      "id": "p2",
      "mail": "",
      "emailAddresses": [{ "address": "plain@x.com" }]
    }))
    .unwrap();
    assert_eq!(entity.email().as_deref(), Some("plain@x.com"));

    let entity = Entity::user("u1", Some("u1@x.com".into()));
    assert_eq!(entity.email().as_deref(), Some("u1@x.com"));
  }

  #[test]
  fn email_strips_display_name() {
    let entity = Entity::user("u1", Some("Alice Liddell <alice@x.com>".into()));
    assert_eq!(entity.email().as_deref(), Some("alice@x.com"));
  }

  #[test]
  fn no_address_yields_none() {
    let entity = Entity::from_graph(&json!({
      "id": "u1",
      "userPrincipalName": "u1@tenant.onmicrosoft.com"
    }))
    .unwrap();
    assert_eq!(entity.email(), None);
  }
}
