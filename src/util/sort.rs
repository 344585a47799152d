//! Prefix filtering and ordering of records.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::path::{Path, Segment, lookup};
use crate::error::Result;
use crate::types::Record;

/// Options for [`sort`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOptions {
    /// Dot path into the record viewed as `{ ID, data }`, e.g. `data.score`.
    /// One leading `.` is ignored.
    #[serde(default)]
    pub sort: Option<String>,
    /// Keep at most this many records.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SortOptions {
    pub fn by(sort: impl Into<String>) -> Self {
        Self {
            sort: Some(sort.into()),
            limit: None,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Keep the records whose ID starts with `key`, optionally ordered.
///
/// With a sort path the records are sorted ascending by the value at that
/// path (stable), then the whole list is reversed, giving descending order.
/// An empty `key` matches nothing.
pub fn sort(key: &str, data: Vec<Record>, ops: &SortOptions) -> Result<Vec<Record>> {
    if key.is_empty() {
        return Ok(Vec::new());
    }

    let mut matched: Vec<Record> = data.into_iter().filter(|r| r.id.starts_with(key)).collect();

    if let Some(sort) = ops.sort.as_deref() {
        let sort = sort.strip_prefix('.').unwrap_or(sort);
        if !sort.is_empty() {
            let path: Path = sort.parse()?;
            let mut keyed: Vec<(Option<Value>, Record)> = matched
                .into_iter()
                .map(|record| (record_field(&record, &path), record))
                .collect();
            keyed.sort_by(|(a, _), (b, _)| compare_values(a.as_ref(), b.as_ref()));
            matched = keyed.into_iter().rev().map(|(_, record)| record).collect();
        }
    }

    if let Some(limit) = ops.limit {
        matched.truncate(limit);
    }

    Ok(matched)
}

fn record_field(record: &Record, path: &Path) -> Option<Value> {
    let (first, rest) = path.segments().split_first()?;
    match first {
        Segment::Key(k) if k == "ID" && rest.is_empty() => Some(Value::String(record.id.clone())),
        Segment::Key(k) if k == "data" => lookup(&record.data, rest).cloned(),
        _ => None,
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Ascending order over optional JSON values.
///
/// Missing values sort after everything else. Values of different kinds are
/// ordered null, boolean, number, string, array, object; arrays and objects
/// compare equal among themselves.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            (Value::Number(x), Value::Number(y)) => {
                let x = x.as_f64().unwrap_or(0.0);
                let y = y.as_f64().unwrap_or(0.0);
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            (Value::String(x), Value::String(y)) => x.cmp(y),
            _ => type_rank(a).cmp(&type_rank(b)),
        },
    }
}
