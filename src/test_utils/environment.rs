//! Temporary project directories for tests.

use crate::manifest::{ManifestDocument, manifest_path_in};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A project directory that is removed when dropped.
pub struct TestProject {
    temp_dir: TempDir,
}

impl TestProject {
    /// Create an empty project directory.
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new().context("Failed to create temp dir")?,
        })
    }

    /// Project root.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// `superface/` inside the project.
    #[must_use]
    pub fn manifest_dir(&self) -> PathBuf {
        self.manifest_path().parent().map(Path::to_path_buf).unwrap_or_default()
    }

    /// `superface/super.json` inside the project.
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        manifest_path_in(self.path())
    }

    /// Write a file relative to the project root, creating parent directories.
    pub fn write_file(&self, relative: impl AsRef<Path>, content: &str) -> Result<PathBuf> {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Write `super.json` verbatim.
    pub fn write_manifest(&self, content: &str) -> Result<PathBuf> {
        self.write_file(self.manifest_path(), content)
    }

    /// Raw `super.json` content.
    pub fn read_manifest(&self) -> Result<String> {
        fs::read_to_string(self.manifest_path()).context("Failed to read super.json")
    }

    /// Parsed `super.json`.
    pub fn load_manifest(&self) -> Result<ManifestDocument> {
        ManifestDocument::load(&self.manifest_path())
    }
}
