//! Nested paths into JSON values.
//!
//! A [`Path`] is the part of a dot-path key after the record ID: `items[0].name`
//! or `items.0.name`. Reads walk objects by key and arrays by index; writes
//! create whatever containers are missing along the way.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use thiserror::Error;

/// Error type for path parsing and path writes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("empty path")]
    Empty,
    #[error("empty segment at position {0}")]
    EmptySegment(usize),
    #[error("unclosed bracket starting at position {0}")]
    UnclosedBracket(usize),
    #[error("invalid array index at position {0}: {1:?}")]
    InvalidIndex(usize, String),
    /// A non-numeric key was used to step into an array.
    #[error("cannot use key {0:?} on an array")]
    KeyOnArray(String),
    #[error("array index {0} is too far past the end of the array")]
    IndexOutOfRange(usize),
}

/// How many `null` slots a write may add past the end of an array.
pub const MAX_ARRAY_PADDING: usize = 10_000;

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Object key: `.foo`
    Key(String),
    /// Array index: `[0]`
    Index(usize),
}

impl Segment {
    /// Array index this segment selects, if any.
    ///
    /// Bracketed indices always qualify; plain keys qualify when they are a
    /// canonical non-negative integer (`"0"`, `"12"`, but not `"01"`).
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Segment::Index(i) => Some(*i),
            Segment::Key(k) => canonical_index(k),
        }
    }

    /// Object key this segment selects.
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            Segment::Key(k) => Cow::Borrowed(k),
            Segment::Index(i) => Cow::Owned(i.to_string()),
        }
    }

    fn empty_container(&self) -> Value {
        match self.as_index() {
            Some(_) => Value::Array(Vec::new()),
            None => Value::Object(Map::new()),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(k) => write!(f, "{}", k),
            Segment::Index(i) => write!(f, "[{}]", i),
        }
    }
}

fn canonical_index(key: &str) -> Option<usize> {
    let digits_only = !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit());
    if digits_only && (key == "0" || !key.starts_with('0')) {
        key.parse().ok()
    } else {
        None
    }
}

/// Returns `true` for values a path can step into.
pub fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// A parsed nested path.
///
/// # Examples
///
/// ```
/// use dotkv::util::Path;
/// use serde_json::json;
///
/// let path: Path = "items[1].name".parse().unwrap();
/// let doc = json!({ "items": [{ "name": "a" }, { "name": "b" }] });
/// assert_eq!(path.get(&doc), Some(&json!("b")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// Create a path from already-split segments.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Read the value at this path, `None` when any step is missing.
    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        lookup(root, &self.segments)
    }

    /// Write `value` at this path.
    ///
    /// Missing steps are created: an array when the segment is an index,
    /// an object otherwise. A step that exists but is not a container is
    /// replaced. Writing past the end of an array pads it with `null`.
    pub fn set(&self, root: &mut Value, value: Value) -> Result<(), PathError> {
        let mut node = root;
        for segment in &self.segments {
            node = slot_mut(node, segment)?;
        }
        *node = value;
        Ok(())
    }

    /// Remove the value at this path. Returns whether anything was removed.
    ///
    /// Array elements are removed, shifting later elements down.
    pub fn unset(&self, root: &mut Value) -> bool {
        let Some((last, parents)) = self.segments.split_last() else {
            return false;
        };

        let mut node = root;
        for segment in parents {
            node = match step_mut(node, segment) {
                Some(next) => next,
                None => return false,
            };
        }

        match node {
            Value::Object(map) => map.remove(last.as_key().as_ref()).is_some(),
            Value::Array(items) => match last.as_index() {
                Some(index) if index < items.len() => {
                    items.remove(index);
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }
}

/// Read the value at `segments` below `root`.
pub(crate) fn lookup<'a>(root: &'a Value, segments: &[Segment]) -> Option<&'a Value> {
    segments.iter().try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(segment.as_key().as_ref()),
        Value::Array(items) => segment.as_index().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn step_mut<'a>(node: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    match node {
        Value::Object(map) => map.get_mut(segment.as_key().as_ref()),
        Value::Array(items) => segment.as_index().and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

fn slot_mut<'a>(node: &'a mut Value, segment: &Segment) -> Result<&'a mut Value, PathError> {
    let len = match node {
        Value::Array(items) => Some(items.len()),
        Value::Object(_) => None,
        _ => segment.as_index().map(|_| 0),
    };
    if let (Some(len), Some(index)) = (len, segment.as_index()) {
        if index > len.saturating_add(MAX_ARRAY_PADDING) {
            return Err(PathError::IndexOutOfRange(index));
        }
    }

    if !is_container(node) {
        *node = segment.empty_container();
    }

    match node {
        Value::Array(items) => {
            let index = segment
                .as_index()
                .ok_or_else(|| PathError::KeyOnArray(segment.to_string()))?;
            if index >= items.len() {
                let len = index
                    .checked_add(1)
                    .ok_or(PathError::IndexOutOfRange(index))?;
                items.resize(len, Value::Null);
            }
            items
                .get_mut(index)
                .ok_or_else(|| PathError::InvalidIndex(index, segment.to_string()))
        }
        Value::Object(map) => Ok(map
            .entry(segment.as_key().into_owned())
            .or_insert(Value::Null)),
        // replaced with a container above
        _ => Err(PathError::KeyOnArray(segment.to_string())),
    }
}

impl FromStr for Path {
    type Err = PathError;

    /// Parse `a.b`, `a[0].b` or `a.0.b`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        let mut current = String::new();
        // a bracket closes its own segment, so a following '.' is not empty
        let mut after_bracket = false;
        let mut chars = s.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '.' => {
                    if current.is_empty() {
                        if !after_bracket {
                            return Err(PathError::EmptySegment(pos));
                        }
                    } else {
                        segments.push(Segment::Key(std::mem::take(&mut current)));
                    }
                    if chars.peek().is_none() {
                        return Err(PathError::EmptySegment(pos + 1));
                    }
                    after_bracket = false;
                }
                '[' => {
                    if !current.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut current)));
                    }
                    let mut digits = String::new();
                    let mut closed = false;
                    for (_, d) in chars.by_ref() {
                        if d == ']' {
                            closed = true;
                            break;
                        }
                        digits.push(d);
                    }
                    if !closed {
                        return Err(PathError::UnclosedBracket(pos));
                    }
                    let index = digits
                        .parse::<usize>()
                        .map_err(|_| PathError::InvalidIndex(pos + 1, digits.clone()))?;
                    segments.push(Segment::Index(index));
                    after_bracket = true;
                }
                _ => {
                    current.push(c);
                    after_bracket = false;
                }
            }
        }

        if !current.is_empty() {
            segments.push(Segment::Key(current));
        }

        Ok(Self { segments })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 && matches!(segment, Segment::Key(_)) {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}
