//! Cross-platform utilities and helpers
//!
//! # Modules
//!
//! - [`fs`] - Directory creation and atomic file writes
//! - [`platform`] - Manifest path normalization and relative path computation
//! - [`progress`] - Spinners for long-running operations

pub mod fs;
pub mod platform;
pub mod progress;

pub use fs::{atomic_write, ensure_dir, safe_write};
pub use platform::{normalize_path, normalize_path_for_storage, relative_path};
pub use progress::Spinner;
