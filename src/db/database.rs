//! Table facade: key-value operations over one fjall keyspace.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use fjall::Keyspace;
use rand::seq::SliceRandom;
use serde_json::Value;
use tokio::sync::broadcast;

use super::base::{Base, TableHandle};
use crate::error::{Error, Result};
use crate::events::Event;
use crate::logging::{debug, info, trace};
use crate::ops;
use crate::transfer;
use crate::types::{
    ConnectionOptions, ImportOptions, Latency, MathOp, QuickDbRecord, RawQuery, Record, ValueType,
};
use crate::util::{self, SortOptions, parse_key};

/// Table used when none is named.
pub const DEFAULT_TABLE: &str = "JSON";

/// Record written and removed by [`Database::fetch_latency`].
pub const LATENCY_KEY: &str = "__latency__";

/// Key-value operations on one table.
///
/// Cloning is cheap; clones and [`table`](Self::table) handles share the
/// connection.
///
/// # Example
///
/// ```ignore
/// use dotkv::{ConnectionOptions, Database};
/// use serde_json::json;
///
/// let db = Database::open("fjall://.dotkv", "JSON", ConnectionOptions::default())?;
/// db.set("guild.settings.prefix", json!("!"))?;
/// db.push("guild.members", json!(["ada", "grace"]))?;
///
/// let users = db.table("users")?;
/// users.add("ada.xp", 25.0)?;
/// ```
#[derive(Clone)]
pub struct Database {
    base: Arc<Base>,
    name: String,
}

fn validate_table_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= 200
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidTable(name.to_string()))
    }
}

fn load(keyspace: &Keyspace, id: &str) -> Result<Option<Value>> {
    let Some(bytes) = keyspace.get(id)? else {
        return Ok(None);
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

fn store(keyspace: &Keyspace, id: &str, data: &Value) -> Result<()> {
    let bytes = serde_json::to_vec(data)?;
    keyspace.insert(id, bytes.as_slice())?;
    Ok(())
}

fn ids(keyspace: &Keyspace) -> Vec<String> {
    keyspace
        .iter()
        .filter_map(|kv| kv.key().ok().map(|k| String::from_utf8_lossy(&k).into_owned()))
        .collect()
}

fn scan(keyspace: &Keyspace) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for id in ids(keyspace) {
        if let Some(data) = load(keyspace, &id)? {
            records.push(Record::new(id, data));
        }
    }
    Ok(records)
}

impl Database {
    /// Create an unconnected facade for table `name`.
    pub fn new(name: &str, options: ConnectionOptions) -> Result<Self> {
        validate_table_name(name)?;
        Ok(Self {
            base: Arc::new(Base::new(options)),
            name: name.to_string(),
        })
    }

    /// Create a facade for table `name` and connect it to `url`.
    pub fn open(url: &str, name: &str, options: ConnectionOptions) -> Result<Self> {
        let db = Self::new(name, options)?;
        db.connect(url)?;
        Ok(db)
    }

    /// Handle to another table on the same connection.
    pub fn table(&self, name: &str) -> Result<Self> {
        validate_table_name(name)?;
        Ok(Self {
            base: Arc::clone(&self.base),
            name: name.to_string(),
        })
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> &Base {
        &self.base
    }

    pub fn connect(&self, url: &str) -> Result<()> {
        self.base.connect(url)
    }

    pub fn disconnect(&self) -> Result<()> {
        self.base.disconnect()
    }

    pub fn url(&self) -> Option<String> {
        self.base.url()
    }

    pub fn is_connected(&self) -> bool {
        self.base.is_connected()
    }

    pub fn uptime(&self) -> Duration {
        self.base.uptime()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.base.subscribe()
    }

    fn with_table<T>(&self, f: impl FnOnce(&TableHandle<'_>) -> Result<T>) -> Result<T> {
        self.base.with_table(&self.name, f)
    }

    fn with_table_mut<T>(&self, f: impl FnOnce(&TableHandle<'_>) -> Result<T>) -> Result<T> {
        self.base.with_table_mut(&self.name, f)
    }

    /// Set a value, creating the record on first write. Returns the new record data.
    pub fn set(&self, key: &str, value: Value) -> Result<Value> {
        let parsed = parse_key(key);
        let id = parsed.id()?;
        debug!(table = %self.name, key = key, "setting value");

        self.with_table_mut(|table| {
            let current = load(&table.keyspace, id)?;
            let data = ops::resolve_set(&parsed, current, value)?;
            store(&table.keyspace, id, &data)?;
            table.flush()?;
            Ok(data)
        })
    }

    /// Delete a record, or only the key's target inside it.
    ///
    /// Returns `false` when there was nothing to delete.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let parsed = parse_key(key);
        let id = parsed.id()?;
        debug!(table = %self.name, key = key, "deleting");

        self.with_table_mut(|table| {
            let Some(mut data) = load(&table.keyspace, id)? else {
                return Ok(false);
            };
            if parsed.target.is_some() {
                if !util::unset_data(key, &mut data)? {
                    return Ok(false);
                }
                store(&table.keyspace, id, &data)?;
            } else {
                table.keyspace.remove(id)?;
            }
            table.flush()?;
            Ok(true)
        })
    }

    /// Returns `true` if a value is stored at `key`.
    pub fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Alias of [`exists`](Self::exists).
    pub fn has(&self, key: &str) -> Result<bool> {
        self.exists(key)
    }

    /// Returns `true` if the value at `key` equals `value`.
    pub fn is(&self, key: &str, value: &Value) -> Result<bool> {
        Ok(self.get(key)?.as_ref() == Some(value))
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let parsed = parse_key(key);
        let id = parsed.id()?;
        trace!(table = %self.name, key = key, "getting value");

        self.with_table(|table| {
            let Some(data) = load(&table.keyspace, id)? else {
                return Ok(None);
            };
            Ok(util::get_data(key, &data)?.cloned())
        })
    }

    /// Alias of [`get`](Self::get).
    pub fn fetch(&self, key: &str) -> Result<Option<Value>> {
        self.get(key)
    }

    /// All records in ID order, at most `limit` when given and non-zero.
    pub fn all(&self, limit: Option<usize>) -> Result<Vec<Record>> {
        let mut records = self.with_table(|table| scan(&table.keyspace))?;
        if let Some(limit) = limit.filter(|l| *l > 0) {
            records.truncate(limit);
        }
        Ok(records)
    }

    /// Remove every record in the table. Returns how many were removed.
    pub fn delete_all(&self) -> Result<usize> {
        self.base
            .events()
            .debug("Deleting everything from the database...");

        let count = self.with_table_mut(|table| {
            let keys = ids(&table.keyspace);
            for key in &keys {
                table.keyspace.remove(key.as_str())?;
            }
            table.flush()?;
            Ok(keys.len())
        })?;

        info!(table = %self.name, count, "table cleared");
        Ok(count)
    }

    /// Read the value at `key`, transform it, and write the result back in
    /// one pass. `f` returning `None` skips the write.
    fn update(
        &self,
        key: &str,
        f: impl FnOnce(Option<Value>) -> Result<Option<Value>>,
    ) -> Result<Option<Value>> {
        let parsed = parse_key(key);
        let id = parsed.id()?;

        self.with_table_mut(|table| {
            let data = load(&table.keyspace, id)?;
            let current = match &data {
                Some(data) => util::get_data(key, data)?.cloned(),
                None => None,
            };
            let Some(value) = f(current)? else {
                return Ok(None);
            };
            let updated = ops::resolve_set(&parsed, data, value.clone())?;
            store(&table.keyspace, id, &updated)?;
            table.flush()?;
            Ok(Some(value))
        })
    }

    /// Apply `op` to the number at `key`. Returns the new number.
    ///
    /// A missing value counts as 0.
    pub fn math(&self, key: &str, op: MathOp, operand: f64) -> Result<Value> {
        debug!(table = %self.name, key = key, op = %op, operand, "math");
        let value = self.update(key, |current| {
            ops::apply_math(key, current.as_ref(), op, operand).map(Some)
        })?;
        value.ok_or(Error::InvalidNumber(operand))
    }

    pub fn add(&self, key: &str, value: f64) -> Result<Value> {
        self.math(key, MathOp::Add, value)
    }

    pub fn subtract(&self, key: &str, value: f64) -> Result<Value> {
        self.math(key, MathOp::Subtract, value)
    }

    /// Append to the array at `key`; array values are appended element-wise.
    /// Returns the new array.
    pub fn push(&self, key: &str, value: Value) -> Result<Value> {
        let value = self.update(key, |current| ops::push_values(key, current, value).map(Some))?;
        Ok(value.unwrap_or_else(|| Value::Array(Vec::new())))
    }

    /// Remove matching elements from the array at `key`. Returns the new
    /// array, or `None` when nothing is stored at `key`.
    pub fn pull(&self, key: &str, value: Value) -> Result<Option<Value>> {
        self.update(key, |current| {
            current
                .map(|current| ops::pull_values(key, current, &value))
                .transpose()
        })
    }

    /// Kind of value stored at `key`.
    pub fn value_type(&self, key: &str) -> Result<ValueType> {
        Ok(ValueType::of(self.get(key)?.as_ref()))
    }

    pub fn key_array(&self) -> Result<Vec<String>> {
        self.with_table(|table| Ok(ids(&table.keyspace)))
    }

    pub fn value_array(&self) -> Result<Vec<Value>> {
        Ok(self.all(None)?.into_iter().map(|r| r.data).collect())
    }

    /// Number of records in the table.
    pub fn entries(&self) -> Result<usize> {
        self.with_table(|table| Ok(table.keyspace.iter().count()))
    }

    /// Records as stored, without path resolution.
    pub fn raw(&self, query: &RawQuery) -> Result<Vec<Record>> {
        let records = self.all(None)?;
        Ok(records
            .into_iter()
            .skip(query.skip)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect())
    }

    /// Up to `limit` distinct records chosen at random (at least one is requested).
    pub fn random(&self, limit: usize) -> Result<Vec<Record>> {
        let records = self.all(None)?;
        let mut rng = rand::thread_rng();
        Ok(records
            .choose_multiple(&mut rng, limit.max(1))
            .cloned()
            .collect())
    }

    /// Records whose ID starts with `prefix`, see [`util::sort`].
    pub fn starts_with(&self, prefix: &str, ops: &SortOptions) -> Result<Vec<Record>> {
        util::sort(prefix, self.all(None)?, ops)
    }

    /// Write all records to `<dir>/<file_name>.json` and return the path.
    pub fn export(&self, file_name: Option<&str>, dir: Option<&Path>) -> Result<PathBuf> {
        let records = self.all(None)?;
        transfer::write_export(&records, file_name, dir)
    }

    /// All records in quick.db layout.
    pub fn export_to_quickdb(&self) -> Result<Vec<QuickDbRecord>> {
        transfer::to_quickdb(&self.all(None)?)
    }

    /// Write `records` into the table.
    ///
    /// Returns `false` for an empty input. With `validate`, all records are
    /// checked before anything is written.
    pub fn import(&self, records: Vec<Record>, options: ImportOptions) -> Result<bool> {
        if records.is_empty() {
            return Ok(false);
        }
        self.base
            .events()
            .debug(format!("Importing {} records...", records.len()));

        let written = self.with_table_mut(|table| {
            if options.validate {
                for record in &records {
                    if record.id.is_empty() {
                        return Err(Error::Import("record is missing ID".into()));
                    }
                    if record.data.is_null() {
                        return Err(Error::Import(format!("record {} is missing data", record.id)));
                    }
                    if !options.overwrite_existing && table.keyspace.get(record.id.as_str())?.is_some() {
                        return Err(Error::Import(format!(
                            "document with ID {} already exists",
                            record.id
                        )));
                    }
                }
            }

            let mut written = 0usize;
            for record in &records {
                if record.id.is_empty() {
                    continue;
                }
                if !options.overwrite_existing && table.keyspace.get(record.id.as_str())?.is_some() {
                    trace!(id = %record.id, "skipping existing record");
                    continue;
                }
                store(&table.keyspace, &record.id, &record.data)?;
                written += 1;
            }
            table.flush()?;
            Ok(written)
        })?;

        info!(table = %self.name, written, total = records.len(), "imported records");
        Ok(true)
    }

    /// Time a read and a write against the store.
    ///
    /// Whatever was stored under [`LATENCY_KEY`] beforehand is put back.
    pub fn fetch_latency(&self) -> Result<Latency> {
        let start = Instant::now();
        let previous = self.get(LATENCY_KEY)?;
        let read = start.elapsed();

        let start = Instant::now();
        self.set(LATENCY_KEY, Value::from(read.as_nanos() as u64))?;
        let write = start.elapsed();

        match previous {
            Some(value) => {
                self.set(LATENCY_KEY, value)?;
            }
            None => {
                self.delete(LATENCY_KEY)?;
            }
        }
        Ok(Latency::new(read, write))
    }

    /// Alias of [`fetch_latency`](Self::fetch_latency).
    pub fn ping(&self) -> Result<Latency> {
        self.fetch_latency()
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Database<{{{}}}>", self.name)
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.name)
            .field("url", &self.base.url())
            .finish()
    }
}
