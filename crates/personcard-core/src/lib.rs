//! Core types and trait definitions for the person card assembler.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The transport and cache backends implement the traits defined here; the
//! assembler depends only on those traits.

pub mod cache;
pub mod card;
pub mod config;
pub mod entity;
pub mod error;
pub mod request;
pub mod scopes;
pub mod transport;

pub use error::{Error, Result};
