//! Common test utilities and fixtures.
//!
//! This module provides a test application backed by a throwaway store and a
//! few request helpers shared across the HTTP test suite.

#![cfg(feature = "server")]
#![allow(dead_code)]

use axum_test::TestServer;
use dotkv::server::{AppState, Config, DatabaseConfig, router};
use serde_json::Value;
use tempfile::TempDir;

// =============================================================================
// Test Application
// =============================================================================

/// Test application wrapper that manages a temporary database.
pub struct TestApp {
    pub server: TestServer,
    _temp_dir: TempDir, // Keep alive for test duration
}

impl TestApp {
    /// Create a new test application with a fresh temporary database.
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("db");
        let config = Config {
            database: DatabaseConfig {
                url: format!("fjall://{}", db_path.display()),
                table: "JSON".into(),
                durable: false,
            },
            ..Config::default()
        };
        let state = AppState::from_config(&config)?;
        let server = TestServer::new(router(state))?;
        Ok(Self {
            server,
            _temp_dir: temp_dir,
        })
    }

    /// Path of a record route in `table`.
    pub fn record_url(table: &str, key: &str) -> String {
        format!("/api/v1/tables/{}/records/{}", table, key)
    }

    /// PUT a JSON value at `key`.
    pub async fn set(&self, table: &str, key: &str, value: Value) -> anyhow::Result<Value> {
        let response = self
            .server
            .put(&Self::record_url(table, key))
            .json(&value)
            .await;
        response.assert_status_ok();
        Ok(response.json())
    }

    /// GET the JSON value at `key`.
    pub async fn get(&self, table: &str, key: &str) -> Value {
        let response = self.server.get(&Self::record_url(table, key)).await;
        response.assert_status_ok();
        response.json()
    }
}

// =============================================================================
// Assertion Helpers
// =============================================================================

/// Assert that a JSON error body carries `code`.
pub fn assert_error_code(body: &Value, code: &str) {
    assert_eq!(
        body["error"]["code"].as_str(),
        Some(code),
        "Unexpected error body: {}",
        body
    );
}

/// IDs of a JSON array of records.
pub fn record_ids(body: &Value) -> Vec<String> {
    body.as_array()
        .map(|records| {
            records
                .iter()
                .filter_map(|r| r["ID"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
