//! Shared setup for CLI commands.

use crate::document::HeaderValidator;
use crate::manifest::ManifestFile;
use crate::resolver::SourceResolver;
use crate::store::HttpStoreClient;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Working directory every command starts from.
pub fn working_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to determine the current directory")
}

/// Resolver for `manifest`, backed by the HTTP store and the header validator.
///
/// Creating the resolver never touches the network; requests are only made
/// when a store-backed source is actually resolved or loaded.
pub fn build_resolver(manifest: &ManifestFile) -> Result<SourceResolver> {
    let store = HttpStoreClient::from_env()?;
    Ok(SourceResolver::new(Arc::new(store), Arc::new(HeaderValidator::new()), manifest.dir()))
}
