//! In-memory fallback store.
//!
//! [`MemoryStorage`] keeps records in insertion order and applies the same
//! dot-path rules as the persistent [`Database`](crate::Database). Nothing
//! survives the process unless [`export`](MemoryStorage::export) is called.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::Result;
use crate::logging::debug;
use crate::ops;
use crate::transfer;
use crate::types::Record;
use crate::util::{self, SortOptions, parse_key};

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    records: Vec<Record>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, creating the record when needed. Returns the new record data.
    pub fn set(&mut self, key: &str, value: Value) -> Result<Value> {
        let parsed = parse_key(key);
        let id = parsed.id()?;
        debug!(key = key, "memory set");

        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                let data = ops::resolve_set(&parsed, Some(record.data.clone()), value)?;
                record.data = data.clone();
                Ok(data)
            }
            None => {
                let data = ops::resolve_set(&parsed, None, value)?;
                self.records.push(Record::new(id, data.clone()));
                Ok(data)
            }
        }
    }

    /// Delete a record, or only the key's target inside it.
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        let parsed = parse_key(key);
        let id = parsed.id()?;

        if parsed.target.is_some() {
            return match self.records.iter_mut().find(|r| r.id == id) {
                Some(record) => util::unset_data(key, &mut record.data),
                None => Ok(false),
            };
        }

        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        Ok(self.records.len() != before)
    }

    pub fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Alias of [`exists`](Self::exists).
    pub fn has(&self, key: &str) -> Result<bool> {
        self.exists(key)
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let parsed = parse_key(key);
        let id = parsed.id()?;
        let Some(record) = self.records.iter().find(|r| r.id == id) else {
            return Ok(None);
        };
        Ok(util::get_data(key, &record.data)?.cloned())
    }

    /// Alias of [`get`](Self::get).
    pub fn fetch(&self, key: &str) -> Result<Option<Value>> {
        self.get(key)
    }

    pub fn all(&self) -> Vec<Record> {
        self.records.clone()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Remove every record. Returns how many were removed.
    pub fn delete_all(&mut self) -> usize {
        let count = self.records.len();
        self.records.clear();
        count
    }

    pub fn entries(&self) -> usize {
        self.records.len()
    }

    /// Write all records to `<dir>/<file_name>.json`.
    pub fn export(&self, file_name: Option<&str>, dir: Option<&Path>) -> Result<PathBuf> {
        transfer::write_export(&self.records, file_name, dir)
    }

    pub fn starts_with(&self, prefix: &str, ops: &SortOptions) -> Result<Vec<Record>> {
        util::sort(prefix, self.all(), ops)
    }
}
