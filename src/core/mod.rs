//! Core types for the Superface CLI
//!
//! This module holds the pieces every other layer depends on:
//!
//! - [`error`] - the [`SuperfaceError`] taxonomy, exit codes, and the
//!   user-facing [`ErrorContext`] renderer
//! - [`identifier`] - validated [`ProfileId`]s, provider names, and
//!   `<profileId>@<version>` references
//!
//! # Error Handling Pattern
//!
//! ```rust
//! use superface_cli::core::{SuperfaceError, user_friendly_error};
//!
//! fn example_operation() -> anyhow::Result<()> {
//!     Err(SuperfaceError::NotFoundInManifest {
//!         profile: "starwars/character-information".to_string(),
//!     }
//!     .into())
//! }
//!
//! if let Err(e) = example_operation() {
//!     let friendly = user_friendly_error(e);
//!     assert_eq!(friendly.exit_code(), 2);
//! }
//! ```

pub mod error;
pub mod identifier;

pub use error::{ErrorContext, SuperfaceError, user_friendly_error};
pub use identifier::{ProfileId, ProfileRef, validate_provider_name, validate_version};
