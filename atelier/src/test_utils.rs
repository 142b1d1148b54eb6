//! Shared constructors for the test suites.
//!
//! Every test server gets its own temporary directory, with the storage
//! root pointed at a child that does not exist yet so the create-on-demand
//! and absent-root paths stay exercised. The returned `TempDir` must be
//! held for the lifetime of the test or the directory is removed.

use crate::config::Config;
use crate::Application;
use axum_test::TestServer;
use tempfile::TempDir;

/// Test server with default configuration and a fresh storage root.
pub fn create_test_app() -> (TestServer, TempDir) {
    create_test_app_with(Config::default())
}

/// Test server with the given configuration; the storage root is replaced
/// with a fresh temporary location regardless of what the config says.
pub fn create_test_app_with(mut config: Config) -> (TestServer, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    config.storage.root = dir.path().join("uploads");

    let app = Application::new(config).expect("Failed to create application");
    (app.into_test_server(), dir)
}
