//! Person card data assembler.
//!
//! Builds the batched directory requests behind a person card, merges the
//! responses with cached state, and exposes the two chat calls the card
//! offers. Works against any [`GraphTransport`] and [`CardCache`].
//!
//! ```rust,ignore
//! let fetched = personcard::fetch_card_data(&graph, &cache, &entity, false, &config).await;
//! for failure in &fetched.failures {
//!   tracing::info!(section = %failure.section, "section unavailable");
//! }
//! ```
//!
//! [`GraphTransport`]: personcard_core::transport::GraphTransport
//! [`CardCache`]: personcard_core::cache::CardCache

pub mod chat;
pub mod fetch;
pub mod profile;
pub mod requests;

pub use chat::{Chat, ChatMessage, ChatMessageDraft, ItemBody, create_chat, send_message};
pub use fetch::{build_card_batch, drop_disabled_direct_reports, fetch_card_data};
pub use profile::get_profile;

#[cfg(test)]
mod tests;
