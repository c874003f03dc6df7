//! Command-line interface for the Superface CLI.
//!
//! Two commands own the manifest core:
//!
//! - `install` - resolve profiles (and optionally providers) and record them in
//!   `superface/super.json`
//! - `check` - compare installed profiles, maps and provider definitions for
//!   compatibility without touching the manifest
//!
//! # Global Options
//!
//! All commands support these global options:
//! - `--verbose` - Enable debug logging
//! - `--quiet` - Suppress summaries, progress and (for `check`) warnings
//! - `--no-progress` - Disable spinners
//!
//! # Example
//!
//! ```bash
//! superface install starwars/character-information --providers swapi
//! superface check --profileId starwars/character-information --providerName swapi --json
//! ```
//!
//! Commands return the process exit code instead of exiting themselves, so
//! `main` stays the only place that terminates the process.

mod check;
pub mod common;
mod install;

#[cfg(test)]
mod tests;

use crate::constants::NO_PROGRESS_ENV;
use anyhow::Result;
use clap::{Parser, Subcommand};

/// Runtime configuration for CLI execution.
///
/// Holds the settings derived from global flags so tests can inspect them
/// without touching the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Default log filter used when `RUST_LOG` is not set.
    ///
    /// - `"debug"` with `--verbose`
    /// - `"error"` with `--quiet`
    /// - `"warn"` otherwise
    pub log_level: String,

    /// Whether to disable progress indicators.
    ///
    /// When `true`, [`apply_to_env`](Self::apply_to_env) sets
    /// `SUPERFACE_NO_PROGRESS` so every spinner created afterwards is hidden.
    pub no_progress: bool,
}

impl CliConfig {
    /// Apply this configuration to the process environment.
    ///
    /// # Safety
    ///
    /// Mutates the process environment. Call it once from `main`, before the
    /// async runtime (or any other thread) is started.
    pub unsafe fn apply_to_env(&self) {
        if self.no_progress {
            // SAFETY: the caller guarantees no other thread is running.
            unsafe { std::env::set_var(NO_PROGRESS_ENV, "1") };
        }
    }
}

/// Main CLI structure for the Superface CLI.
#[derive(Parser, Debug)]
#[command(
    name = "superface",
    about = "Manage and check the Superface integration manifest",
    version,
    long_about = "Install profiles and providers into superface/super.json and check that installed profiles, maps and providers fit together."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging.
    ///
    /// Equivalent to `RUST_LOG=debug` unless `RUST_LOG` is already set.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress summaries, progress and warnings.
    ///
    /// For `check`, warnings are dropped from the report and no longer affect
    /// the exit code.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable progress spinners.
    ///
    /// Also enabled by setting `SUPERFACE_NO_PROGRESS`.
    #[arg(long, global = true)]
    no_progress: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Install profiles and providers into super.json.
    ///
    /// See [`install::InstallCommand`] for options and behavior.
    Install(install::InstallCommand),

    /// Check installed profiles, maps and providers for compatibility.
    ///
    /// See [`check::CheckCommand`] for options and behavior.
    Check(check::CheckCommand),
}

impl Cli {
    /// Build a [`CliConfig`] from the parsed CLI arguments.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use superface_cli::cli::Cli;
    /// use clap::Parser;
    ///
    /// let cli = Cli::parse_from(["superface", "--verbose", "check"]);
    /// assert_eq!(cli.build_config().log_level, "debug");
    /// ```
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: log_level.to_string(),
            no_progress: self.no_progress,
        }
    }

    /// Execute the selected command and return the process exit code.
    ///
    /// # Errors
    ///
    /// Fatal errors (manifest load failures, precondition errors, store
    /// outages during `check`) are returned for rendering at the CLI boundary.
    /// Per-item install failures and check findings are reported through the
    /// exit code instead.
    pub async fn execute(self) -> Result<i32> {
        match self.command {
            Commands::Install(cmd) => cmd.execute(self.quiet).await,
            Commands::Check(cmd) => cmd.execute(self.quiet).await,
        }
    }
}
