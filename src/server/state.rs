//! Application state management.

use crate::types::ConnectionOptions;
use crate::{Database, Error};

use super::config::Config;
use super::error::ApiError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the configured default table; other tables share its connection.
    db: Database,
}

impl AppState {
    /// Open the configured store.
    pub fn from_config(config: &Config) -> Result<Self, StateError> {
        let options = ConnectionOptions {
            durable: config.database.durable,
        };
        let db = Database::open(&config.database.url, &config.database.table, options).map_err(
            |source| StateError::Open {
                url: config.database.url.clone(),
                source,
            },
        )?;
        Ok(Self { db })
    }

    /// Wrap an already opened database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The configured default table.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Handle to `name` on the shared connection.
    pub fn table(&self, name: &str) -> Result<Database, ApiError> {
        Ok(self.db.table(name)?)
    }
}

/// Errors that can occur when setting up application state.
#[derive(Debug)]
pub enum StateError {
    /// Failed to open the store.
    Open { url: String, source: Error },
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateError::Open { url, source } => {
                write!(f, "Failed to open database at '{}': {}", url, source)
            }
        }
    }
}

impl std::error::Error for StateError {}
