//! Dot-path key helpers.
//!
//! A key such as `"user.items[0]"` splits at the first `.` into the record ID
//! (`user`) and a target path inside the record data (`items[0]`). The
//! functions here are pure: they never touch storage.

mod path;
mod sort;

use serde_json::Value;

use crate::error::{Error, Result};

pub use path::{MAX_ARRAY_PADDING, Path, PathError, Segment, is_container};
pub use sort::{SortOptions, compare_values, sort};

/// A key split into record ID and target path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedKey {
    /// Record ID, `None` for an empty key.
    pub key: Option<String>,
    /// Everything after the first `.`, `None` when absent or empty.
    pub target: Option<String>,
}

impl ParsedKey {
    /// The record ID, or [`Error::InvalidKey`] when the key had none.
    pub fn id(&self) -> Result<&str> {
        self.key
            .as_deref()
            .ok_or_else(|| Error::InvalidKey(self.to_string()))
    }

    /// The parsed target path, if the key has one.
    pub fn target_path(&self) -> Result<Option<Path>> {
        self.target
            .as_deref()
            .map(|t| t.parse::<Path>().map_err(Error::from))
            .transpose()
    }
}

impl std::fmt::Display for ParsedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.key, &self.target) {
            (Some(key), Some(target)) => write!(f, "{}.{}", key, target),
            (Some(key), None) => write!(f, "{}", key),
            (None, Some(target)) => write!(f, ".{}", target),
            (None, None) => Ok(()),
        }
    }
}

/// Returns `true` if `key` can address a record.
pub fn is_key(key: &str) -> bool {
    parse_key(key).key.is_some()
}

/// Returns `true` if `data` is present.
///
/// Absent values (`None`) model an undefined value and cannot be stored.
pub fn is_value(data: Option<&Value>) -> bool {
    data.is_some()
}

/// Split a key into record ID and target.
///
/// ```
/// use dotkv::util::parse_key;
///
/// let parsed = parse_key("myitem.items");
/// assert_eq!(parsed.key.as_deref(), Some("myitem"));
/// assert_eq!(parsed.target.as_deref(), Some("items"));
/// ```
pub fn parse_key(key: &str) -> ParsedKey {
    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
    match key.split_once('.') {
        Some((id, target)) => ParsedKey {
            key: non_empty(id),
            target: non_empty(target),
        },
        None => ParsedKey {
            key: non_empty(key),
            target: None,
        },
    }
}

/// Write `value` at the key's target inside `data`.
///
/// Without a target `data` is returned unchanged. With a target, `data` must
/// be an object or an array; anything else fails with
/// [`Error::TargetNotObject`].
pub fn set_data(key: &str, mut data: Value, value: Value) -> Result<Value> {
    let parsed = parse_key(key);
    let Some(path) = parsed.target_path()? else {
        return Ok(data);
    };
    ensure_container(key, &data)?;
    path.set(&mut data, value)?;
    Ok(data)
}

/// Remove the key's target from `data`. Returns whether anything was removed.
pub fn unset_data(key: &str, data: &mut Value) -> Result<bool> {
    let parsed = parse_key(key);
    let Some(path) = parsed.target_path()? else {
        return Ok(false);
    };
    ensure_container(key, data)?;
    Ok(path.unset(data))
}

/// Read the key's target from `data`, or `data` itself when there is no target.
pub fn get_data<'a>(key: &str, data: &'a Value) -> Result<Option<&'a Value>> {
    let parsed = parse_key(key);
    match parsed.target_path()? {
        Some(path) => Ok(path.get(data)),
        None => Ok(Some(data)),
    }
}

fn ensure_container(key: &str, data: &Value) -> Result<()> {
    if is_container(data) {
        Ok(())
    } else {
        Err(Error::TargetNotObject(key.to_string()))
    }
}
