//! Record handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::logging::debug;
use crate::types::{MathOp, Record, ValueType};

use super::super::{error::ApiError, state::AppState};

/// Query parameters for listing records.
#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

/// Body of a math request.
#[derive(Debug, Deserialize)]
pub struct MathRequest {
    /// Operator name or symbol: `add`, `-`, `mul`, ...
    pub op: String,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: usize,
}

#[derive(Debug, Serialize)]
pub struct TypeResponse {
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

/// List records in a table.
pub async fn list_records(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let db = state.table(&table)?;
    Ok(Json(db.all(query.limit)?))
}

/// Remove every record in a table.
pub async fn delete_all(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let db = state.table(&table)?;
    let deleted = db.delete_all()?;
    Ok(Json(DeletedResponse { deleted }))
}

/// Get the value at a dot-path key.
pub async fn get_value(
    State(state): State<AppState>,
    Path((table, key)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let db = state.table(&table)?;
    let value = db
        .get(&key)?
        .ok_or_else(|| ApiError::key_not_found(&table, &key))?;
    Ok(Json(value))
}

/// Set the value at a dot-path key and return the record data.
pub async fn set_value(
    State(state): State<AppState>,
    Path((table, key)): Path<(String, String)>,
    Json(value): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let db = state.table(&table)?;
    Ok(Json(db.set(&key, value)?))
}

/// Delete a record or a nested value.
pub async fn delete_value(
    State(state): State<AppState>,
    Path((table, key)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let db = state.table(&table)?;
    if db.delete(&key)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::key_not_found(&table, &key))
    }
}

/// Apply an arithmetic operator to the number at a key.
pub async fn math(
    State(state): State<AppState>,
    Path((table, key)): Path<(String, String)>,
    Json(request): Json<MathRequest>,
) -> Result<Json<Value>, ApiError> {
    let db = state.table(&table)?;
    let op: MathOp = request.op.parse()?;
    debug!(table = %table, key = %key, op = %op, "math request");
    Ok(Json(db.math(&key, op, request.value)?))
}

/// Append to the array at a key.
pub async fn push(
    State(state): State<AppState>,
    Path((table, key)): Path<(String, String)>,
    Json(value): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let db = state.table(&table)?;
    Ok(Json(db.push(&key, value)?))
}

/// Remove matching elements from the array at a key.
pub async fn pull(
    State(state): State<AppState>,
    Path((table, key)): Path<(String, String)>,
    Json(value): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let db = state.table(&table)?;
    let array = db
        .pull(&key, value)?
        .ok_or_else(|| ApiError::key_not_found(&table, &key))?;
    Ok(Json(array))
}

/// Kind of value stored at a key.
pub async fn value_type(
    State(state): State<AppState>,
    Path((table, key)): Path<(String, String)>,
) -> Result<Json<TypeResponse>, ApiError> {
    let db = state.table(&table)?;
    Ok(Json(TypeResponse {
        value_type: db.value_type(&key)?,
    }))
}
