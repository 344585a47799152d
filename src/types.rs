//! Data types shared by the stores.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// One stored document: a top-level ID and its data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "ID")]
    pub id: String,
    /// Missing `data` deserializes as `null`.
    #[serde(default)]
    pub data: Value,
}

impl Record {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// A record in quick.db layout, with `data` holding JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickDbRecord {
    #[serde(rename = "ID")]
    pub id: String,
    pub data: String,
}

impl TryFrom<&Record> for QuickDbRecord {
    type Error = Error;

    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id.clone(),
            data: serde_json::to_string(&record.data)?,
        })
    }
}

/// Round-trip timings in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Latency {
    pub read: f64,
    pub write: f64,
    pub average: f64,
}

impl Latency {
    pub fn new(read: Duration, write: Duration) -> Self {
        let read = read.as_secs_f64() * 1000.0;
        let write = write.as_secs_f64() * 1000.0;
        Self {
            read,
            write,
            average: (read + write) / 2.0,
        }
    }
}

/// Arithmetic operator for `math`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl FromStr for MathOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" | "+" => Ok(Self::Add),
            "subtract" | "sub" | "-" => Ok(Self::Subtract),
            "multiply" | "mul" | "*" => Ok(Self::Multiply),
            "divide" | "div" | "/" => Ok(Self::Divide),
            "mod" | "%" => Ok(Self::Modulo),
            other => Err(Error::InvalidOperator(other.to_string())),
        }
    }
}

impl fmt::Display for MathOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::Modulo => "mod",
        };
        write!(f, "{}", s)
    }
}

/// Kind of value stored under a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Null,
    /// Nothing stored at the key.
    Undefined,
}

impl ValueType {
    pub fn of(value: Option<&Value>) -> Self {
        match value {
            None => Self::Undefined,
            Some(Value::Null) => Self::Null,
            Some(Value::Bool(_)) => Self::Boolean,
            Some(Value::Number(_)) => Self::Number,
            Some(Value::String(_)) => Self::String,
            Some(Value::Array(_)) => Self::Array,
            Some(Value::Object(_)) => Self::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Null => "null",
            Self::Undefined => "undefined",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for importing records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Replace records whose ID already exists instead of skipping them.
    #[serde(default)]
    pub overwrite_existing: bool,
    /// Reject records with an empty ID or null data, and (unless
    /// overwriting) records whose ID already exists.
    #[serde(default)]
    pub validate: bool,
}

/// Window over the raw records of a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawQuery {
    #[serde(default)]
    pub skip: usize,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Options applied when a connection is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionOptions {
    /// Fully sync the journal after every write. When `false`, writes are
    /// buffered and flushed on disconnect.
    pub durable: bool,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self { durable: true }
    }
}
