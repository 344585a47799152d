//! Key-value convenience layer with dot-path access over an embedded document store.
//!
//! Records are `{ ID, data }` documents grouped into named tables. Keys use
//! dot notation: `"user.items"` addresses the nested path `items` inside the
//! record whose `ID` is `user`.
//!
//! # Quick Start
//!
//! ```ignore
//! use dotkv::prelude::*;
//! use serde_json::json;
//!
//! let db = Database::open(".dotkv", "JSON", ConnectionOptions::default())?;
//!
//! db.set("user", json!({ "name": "ada" }))?;
//! db.set("user.items", json!(["pen"]))?;
//! db.push("user.items", json!("paper"))?;
//! db.add("user.score", 10.0)?;
//!
//! assert_eq!(db.get("user.name")?, Some(json!("ada")));
//! ```
//!
//! # Modules
//!
//! - [`util`] - Dot-path key parsing, nested get/set/unset and prefix sorting (always available)
//! - [`memory`] - In-memory fallback store with the same CRUD surface (always available)
//! - [`db`] - Connection handling and the table facade backed by fjall (requires `store` feature)
//! - [`server`] - HTTP API on top of the facade (requires `server` feature)
//!
//! # Feature Flags
//!
//! - `store` - Enable the fjall-backed [`Database`] (enabled by default)
//! - `logging` - Enable library-level tracing (consumers provide their own subscriber)
//! - `cli` - Enable the command-line interface binary
//! - `server` - Enable the HTTP API server
//! - `full` - Enable all features

mod logging;

mod error;
pub mod events;
pub mod memory;
mod ops;
pub mod prelude;
pub mod transfer;
pub mod types;
pub mod util;

#[cfg(feature = "store")]
pub mod db;
#[cfg(feature = "server")]
pub mod server;

pub use error::{Error, Result};
pub use events::{Emitter, Event};
pub use memory::MemoryStorage;
pub use types::{
    ConnectionOptions, ImportOptions, Latency, MathOp, QuickDbRecord, RawQuery, Record, ValueType,
};
pub use util::{ParsedKey, Path, PathError, Segment, SortOptions};

#[cfg(feature = "store")]
pub use db::{Base, DEFAULT_TABLE, Database, LATENCY_KEY};

/// Crate version, as published in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
