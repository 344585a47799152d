//! HTTP API server for dotkv.
//!
//! This module exposes a [`Database`](crate::Database) over a JSON HTTP API
//! using axum. Every route is scoped to a table; tables share one
//! connection opened from the `[database]` section of the [`Config`].

mod config;
mod error;
mod logging;
mod routes;
mod state;

pub use config::{
    Config, ConfigError, CorsConfig, DatabaseConfig, LogFormat, LoggingConfig, ServerConfig,
};
pub use error::ApiError;
pub use logging::{LoggingError, init as init_logging};
pub use routes::router;
pub use state::{AppState, StateError};
