//! SQLite backend for the Weft resource store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each resource is one row; its share
//! state lives in JSON columns so bindings are created, replaced and deleted
//! together with the resource.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
