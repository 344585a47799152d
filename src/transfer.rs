//! Export and import of records as JSON files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::logging::info;
use crate::types::{QuickDbRecord, Record};

/// File name (without extension) used when none is given.
pub const DEFAULT_EXPORT_NAME: &str = "database";

/// Write `records` as a pretty-printed JSON array to `<dir>/<file_name>.json`.
///
/// `file_name` defaults to [`DEFAULT_EXPORT_NAME`], `dir` to the current
/// directory. Missing directories are created. Returns the written path.
pub fn write_export(records: &[Record], file_name: Option<&str>, dir: Option<&Path>) -> Result<PathBuf> {
    let dir = dir.unwrap_or_else(|| Path::new("."));
    let file_name = file_name.unwrap_or(DEFAULT_EXPORT_NAME);

    fs::create_dir_all(dir)?;
    let target = dir.join(format!("{}.json", file_name));
    fs::write(&target, serde_json::to_vec_pretty(records)?)?;

    info!(path = %target.display(), count = records.len(), "exported records");
    Ok(target)
}

/// Read records previously written by [`write_export`].
pub fn read_export(path: &Path) -> Result<Vec<Record>> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Convert records to quick.db layout.
pub fn to_quickdb(records: &[Record]) -> Result<Vec<QuickDbRecord>> {
    records.iter().map(QuickDbRecord::try_from).collect()
}
