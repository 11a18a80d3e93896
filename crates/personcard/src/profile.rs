//! Extended profile fetch.

use personcard_core::{
  request::{ApiRequest, ApiVersion},
  scopes::PROFILE_SCOPES,
  transport::GraphTransport,
};
use serde_json::Value;

/// Fetch the extended profile for `user_id` from the beta endpoint.
///
/// The profile schema is large and still moving, so it is kept as raw JSON.
/// Errors are returned as-is; the card fetch decides whether to swallow them.
pub async fn get_profile<G: GraphTransport>(
  graph: &G,
  user_id: &str,
) -> Result<Value, G::Error> {
  let request = ApiRequest::new(format!("/users/{user_id}/profile"))
    .version(ApiVersion::Beta)
    .scopes(PROFILE_SCOPES);
  graph.get(&request).await
}
