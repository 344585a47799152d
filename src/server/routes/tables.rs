//! Table-wide query and transfer handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::logging::info;
use crate::types::{ImportOptions, Record};
use crate::util::SortOptions;

use super::super::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct EntriesResponse {
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct RandomQuery {
    #[serde(default = "default_random_limit")]
    pub limit: usize,
}

fn default_random_limit() -> usize {
    1
}

/// Query parameters for a prefix search.
#[derive(Debug, Deserialize, Default)]
pub struct SearchQuery {
    #[serde(default)]
    pub prefix: String,
    /// Sort path, e.g. `data.score`.
    pub sort: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ExportQuery {
    /// `quickdb` for stringified data, anything else for plain records.
    pub format: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ImportQuery {
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default)]
    pub validate: bool,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: bool,
}

/// List record IDs.
pub async fn list_keys(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let db = state.table(&table)?;
    Ok(Json(db.key_array()?))
}

/// Count records.
pub async fn entries(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Json<EntriesResponse>, ApiError> {
    let db = state.table(&table)?;
    Ok(Json(EntriesResponse {
        count: db.entries()?,
    }))
}

/// Random sample of records.
pub async fn random(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(query): Query<RandomQuery>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let db = state.table(&table)?;
    Ok(Json(db.random(query.limit)?))
}

/// Records whose ID starts with a prefix, optionally sorted.
pub async fn search(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let db = state.table(&table)?;
    let ops = SortOptions {
        sort: query.sort,
        limit: query.limit,
    };
    Ok(Json(db.starts_with(&query.prefix, &ops)?))
}

/// Dump every record of a table.
pub async fn export(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let db = state.table(&table)?;
    match query.format.as_deref() {
        Some("quickdb") => Ok(Json(db.export_to_quickdb()?).into_response()),
        Some(other) if other != "json" => Err(ApiError::bad_request(format!(
            "Unknown export format '{}'",
            other
        ))),
        _ => Ok(Json(db.all(None)?).into_response()),
    }
}

/// Load records into a table.
pub async fn import(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(query): Query<ImportQuery>,
    Json(records): Json<Vec<Record>>,
) -> Result<Json<ImportResponse>, ApiError> {
    let db = state.table(&table)?;
    let count = records.len();
    let imported = db.import(
        records,
        ImportOptions {
            overwrite_existing: query.overwrite,
            validate: query.validate,
        },
    )?;
    info!(table = %table, count, imported, "import request");
    Ok(Json(ImportResponse { imported }))
}
