//! API routes and handlers.

mod records;
mod tables;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::types::Latency;

use super::{error::ApiError, state::AppState};

/// Build the API router.
pub fn router(state: AppState) -> Router {
    let table_routes = Router::new()
        // Record operations
        .route(
            "/records",
            get(records::list_records).delete(records::delete_all),
        )
        .route(
            "/records/{key}",
            get(records::get_value)
                .put(records::set_value)
                .delete(records::delete_value),
        )
        .route("/records/{key}/math", post(records::math))
        .route("/records/{key}/push", post(records::push))
        .route("/records/{key}/pull", post(records::pull))
        .route("/records/{key}/type", get(records::value_type))
        // Table queries
        .route("/keys", get(tables::list_keys))
        .route("/entries", get(tables::entries))
        .route("/random", get(tables::random))
        .route("/search", get(tables::search))
        // Transfer
        .route("/export", get(tables::export))
        .route("/import", post(tables::import));

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/ping", get(ping))
        .nest("/api/v1/tables/{table}", table_routes)
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Read and write latency of the store in milliseconds.
async fn ping(State(state): State<AppState>) -> Result<Json<Latency>, ApiError> {
    Ok(Json(state.database().ping()?))
}
