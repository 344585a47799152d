//! Persistent document store backed by fjall.
//!
//! A [`Base`] owns the connection: URL, options, ready time, the open fjall
//! database, and the event [`Emitter`](crate::Emitter). A [`Database`] is a
//! cheap handle to one table of that connection; [`Database::table`] hands
//! out handles to sibling tables sharing the same connection.

mod base;
mod database;

pub use base::{Base, storage_path};
pub use database::{DEFAULT_TABLE, Database, LATENCY_KEY};
