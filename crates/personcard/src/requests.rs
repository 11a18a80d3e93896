//! Request builders: each registers its named entries into a [`Batch`].

use personcard_core::{
  card::CardSection,
  request::Batch,
  scopes::{FILES_SCOPES, MAIL_SCOPES, PEOPLE_SCOPES, USER_READ_SCOPES},
};

/// Fields selected for the entity, each manager and each direct report.
pub const USER_PROPERTIES: &str = "businessPhones,displayName,givenName,jobTitle,department,mail,mobilePhone,officeLocation,preferredLanguage,surname,userPrincipalName,id,accountEnabled";

/// The entity with its full manager chain, plus its direct reports.
///
/// `$count` on the expanded chain needs advanced query support, hence the
/// eventual consistency header.
pub fn build_org_structure_request(batch: &mut Batch, user_id: &str) {
  let expand_managers = format!("manager($levels=max;$select={USER_PROPERTIES})");

  batch.get(
    CardSection::Person,
    format!(
      "/users/{user_id}?$expand={expand_managers}&$select={USER_PROPERTIES}&$count=true"
    ),
    USER_READ_SCOPES,
    &[("ConsistencyLevel", "eventual")],
  );
  batch.get(
    CardSection::DirectReports,
    format!("/users/{user_id}/directReports?$select={USER_PROPERTIES}"),
    USER_READ_SCOPES,
    &[],
  );
}

/// People the entity works with, restricted to actual people.
pub fn build_works_with_request(batch: &mut Batch, user_id: &str) {
  batch.get(
    CardSection::People,
    format!("/users/{user_id}/people?$filter=personType/class eq 'Person'"),
    PEOPLE_SCOPES,
    &[],
  );
}

/// The signed-in user's mail from `email`.
pub fn build_mail_request(batch: &mut Batch, email: &str) {
  batch.get(
    CardSection::Messages,
    format!("/me/messages?$search=\"from:{}\"", search_phrase(email)),
    MAIL_SCOPES,
    &[],
  );
}

/// Files shared with the signed-in user by `shared_by`, or the user's own
/// recently used files when `shared_by` is `None`.
pub fn build_files_request(batch: &mut Batch, shared_by: Option<&str>) {
  let path = match shared_by {
    Some(email) => format!(
      "/me/insights/shared?$filter=lastshared/sharedby/address eq '{}'",
      string_literal(email)
    ),
    None => "/me/insights/used".to_string(),
  };
  batch.get(CardSection::Files, path, FILES_SCOPES, &[]);
}

/// OData string literal body: single quotes are doubled.
fn string_literal(value: &str) -> String { value.replace('\'', "''") }

/// `$search` phrase body: embedded double quotes are backslash-escaped.
fn search_phrase(value: &str) -> String { value.replace('"', "\\\"") }
