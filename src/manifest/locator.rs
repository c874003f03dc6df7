//! Manifest discovery by bounded upward directory scan.
//!
//! The manifest lives at `<project>/superface/super.json`. Discovery checks
//! the start directory first, then up to `max_scan_levels` parents, and stops
//! at the first hit. Callers treat "not found" as "initialize a fresh manifest
//! in the start directory".

use crate::constants::{MANIFEST_DIR, MANIFEST_FILE, MAX_SCAN_LEVELS};
use crate::core::SuperfaceError;
use std::path::{Path, PathBuf};

/// A validated number of parent directories to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanLevels(usize);

impl ScanLevels {
    /// Validate a scan depth.
    ///
    /// # Errors
    ///
    /// [`SuperfaceError::InvalidScanLevel`] when `levels` exceeds [`MAX_SCAN_LEVELS`].
    pub fn new(levels: usize) -> Result<Self, SuperfaceError> {
        if levels > MAX_SCAN_LEVELS {
            return Err(SuperfaceError::InvalidScanLevel {
                requested: levels,
                max: MAX_SCAN_LEVELS,
            });
        }
        Ok(Self(levels))
    }

    /// Number of parent directories to scan.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

/// Path of the manifest file inside a project directory.
#[must_use]
pub fn manifest_path_in(project_dir: &Path) -> PathBuf {
    project_dir.join(MANIFEST_DIR).join(MANIFEST_FILE)
}

/// Find the project directory holding a manifest.
///
/// Returns the first directory (starting with `start_dir`) in which
/// `superface/super.json` exists, or `None` when no manifest exists within
/// range. The scan depth is validated before the filesystem is touched.
///
/// # Examples
///
/// ```rust
/// use superface_cli::manifest::locate;
/// use std::path::Path;
///
/// // Out-of-range depth fails before scanning
/// assert!(locate(Path::new("."), 6).is_err());
/// ```
pub fn locate(start_dir: &Path, max_scan_levels: usize) -> Result<Option<PathBuf>, SuperfaceError> {
    let levels = ScanLevels::new(max_scan_levels)?;

    let mut current = Some(start_dir);
    for _ in 0..=levels.get() {
        let Some(dir) = current else {
            break;
        };
        let candidate = manifest_path_in(dir);
        tracing::trace!("Looking for manifest at {}", candidate.display());
        if candidate.is_file() {
            return Ok(Some(dir.to_path_buf()));
        }
        current = dir.parent();
    }

    Ok(None)
}
