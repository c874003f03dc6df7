//! Superface CLI - manage and check the Superface integration manifest
//!
//! A project declares the profiles, providers and maps it uses in
//! `superface/super.json`. This crate resolves requested profiles and
//! providers from local files or the remote store, merges them into the
//! manifest with deterministic conflict rules, and checks that installed
//! profiles, maps and provider definitions are compatible.
//!
//! # Architecture Overview
//!
//! ```text
//! CLI -> manifest locator -> InstallEngine | CheckEngine
//!     -> SourceResolver -> StoreClient / DocumentValidator
//!     -> manifest mutation (install) or issue list (check)
//!     -> report -> exit code
//! ```
//!
//! # Core Modules
//!
//! ## Manifest
//! - [`manifest`] - `super.json` model, merge rules and discovery
//! - [`core`] - Error taxonomy, exit codes and identifiers
//!
//! ## Resolution
//! - [`resolver`] - Turns install requests and manifest entries into sources
//! - [`store`] - Remote store client (HTTP, with retries)
//! - [`document`] - Profile, map and provider documents and their validation
//!
//! ## Engines
//! - [`installer`] - Concurrent resolution, ordered merge, single write
//! - [`checker`] - Profile/map and map/provider compatibility checks
//! - [`report`] - Human and JSON rendering of outcomes
//!
//! ## Supporting Modules
//! - [`cli`] - Command-line interface
//! - [`config`] - Store configuration from the environment
//! - [`constants`] - File layout, limits and network parameters
//! - [`utils`] - Atomic writes, path normalization and progress spinners
//!
//! # Manifest Format (super.json)
//!
//! ```json
//! {
//!   "profiles": {
//!     "starwars/character-information": {
//!       "version": "1.0.2",
//!       "priority": ["swapi"],
//!       "providers": { "swapi": {} }
//!     },
//!     "local/profile": {
//!       "file": "../profiles/local.supr",
//!       "providers": { "mock": { "file": "../maps/local.mock.suma" } }
//!     }
//!   },
//!   "providers": {
//!     "swapi": {},
//!     "mock": { "file": "../providers/mock.json" }
//!   }
//! }
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! superface install starwars/character-information --providers swapi
//! superface install --local profiles/local.supr --force
//! superface check --profileId starwars/character-information --json
//! ```

// Core functionality modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod manifest;

// Resolution
pub mod document;
pub mod resolver;
pub mod store;

// Engines
pub mod checker;
pub mod installer;
pub mod report;

// Supporting modules
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
