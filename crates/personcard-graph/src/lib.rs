//! HTTPS transport for the person card assembler.
//!
//! [`GraphClient`] implements [`personcard_core::transport::GraphTransport`]
//! against a Microsoft Graph compatible endpoint: single versioned calls and
//! the JSON `$batch` endpoint. Tokens come from a [`TokenProvider`].

pub mod auth;
mod batch;
pub mod client;
pub mod error;

pub use auth::{StaticToken, TokenProvider};
pub use client::{GraphClient, GraphConfig};
pub use error::{Error, Result};
