//! Integration test suite for the Superface CLI
//!
//! End-to-end tests running the `superface` binary against temporary projects.
//! Only local sources are used; the store URL points at an unroutable address
//! so an accidental network call fails fast instead of reaching the internet.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **install**: Installing local profiles and providers, conflicts, argument errors
//! - **check**: Compatibility checks, exit codes, JSON output

use assert_cmd::Command;
use superface_cli::test_utils::TestProject;

mod check;
mod install;

/// Profile identifier used throughout the suite.
pub const PROFILE_ID: &str = "starwars/character-information";

/// A `superface` invocation rooted at `project` with a deterministic environment.
pub fn superface(project: &TestProject) -> Command {
    let mut cmd = Command::cargo_bin("superface").unwrap();
    cmd.current_dir(project.path())
        .env("NO_COLOR", "1")
        .env("SUPERFACE_NO_PROGRESS", "1")
        .env("SUPERFACE_API_URL", "http://127.0.0.1:9")
        .env_remove("SUPERFACE_SDK_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}
