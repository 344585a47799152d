//! Convenient re-exports for common usage patterns.
//!
//! This module provides a single import to bring all commonly used types
//! into scope.
//!
//! # Example
//!
//! ```ignore
//! use dotkv::prelude::*;
//!
//! let db = Database::open(".dotkv", DEFAULT_TABLE, ConnectionOptions::default())?;
//! db.set("points.p1", serde_json::json!({ "x": 10, "y": 20 }))?;
//! db.math("points.p1.x", MathOp::Multiply, 2.0)?;
//! ```

// Unified error handling
pub use crate::error::{Error, Result};

// Records and options
pub use crate::types::{
    ConnectionOptions, ImportOptions, Latency, MathOp, QuickDbRecord, RawQuery, Record, ValueType,
};

// Dot-path helpers
pub use crate::util::{ParsedKey, PathError, Segment, SortOptions, parse_key};

pub use crate::events::{Emitter, Event};
pub use crate::memory::MemoryStorage;

// Persistent store (requires "store" feature)
#[cfg(feature = "store")]
pub use crate::db::{Base, DEFAULT_TABLE, Database};

// Dependency re-exports
pub use serde_json::{Value, json};
