//! SQLite backend for the person card cache.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod cache;
mod encode;
mod schema;

pub mod error;

pub use cache::SqliteCardCache;
pub use error::{Error, Result};
