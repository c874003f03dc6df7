//! Test utilities for the Superface CLI
//!
//! Helpers for unit and integration tests, available under `cfg(test)` and the
//! `test-utils` feature:
//! - [`MockStore`]: an in-memory [`crate::store::StoreClient`] that records calls
//! - [`fixtures`]: profile, map and provider source texts
//! - [`TestProject`]: a temporary project directory with manifest helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use superface_cli::test_utils::{MockStore, TestProject, fixtures};
//!
//! let project = TestProject::new().unwrap();
//! project.write_file("profiles/a.supr", &fixtures::profile_source("a", "1.0.0", &["Run"])).unwrap();
//!
//! let store = MockStore::new().with_profile("a", "1.0.0", "");
//! assert!(store.calls().is_empty());
//! ```

pub mod environment;
pub mod fixtures;
pub mod mock_store;

pub use environment::TestProject;
pub use mock_store::MockStore;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}
