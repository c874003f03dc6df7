//! Source resolution for install and check.
//!
//! The resolver decides *what* a manifest entry should contain and loads the
//! documents an entry points at. It never mutates the manifest.
//!
//! # Install Resolution
//!
//! - [`InstallRequest::Local`]: the file must exist; the profile identifier is
//!   read from its header through the [`DocumentValidator`], and the entry
//!   records the path relative to the manifest directory.
//! - [`InstallRequest::Store`]: the identifier is validated before any network
//!   call. Without a version the store's latest version is pinned; with one,
//!   the version is checked to exist.
//!
//! # Check Loading
//!
//! [`SourceResolver::load_profile`], [`SourceResolver::load_map`] and
//! [`SourceResolver::load_provider`] read local files relative to the manifest
//! directory or fetch from the store. Provider definitions are memoized per
//! resolver, so a provider shared by many bindings is fetched once.

use crate::core::{ProfileId, SuperfaceError, validate_provider_name, validate_version};
use crate::document::{DocumentValidator, MapDocument, ProfileDocument, ProviderDefinition};
use crate::manifest::{BindingSource, ProfileSource, ProviderSource};
use crate::store::{MapAddress, StoreClient};
use crate::utils::{normalize_path, normalize_path_for_storage, relative_path};
use dashmap::DashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A request to install one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallRequest {
    /// A local profile source file.
    Local {
        /// Path of the `.supr` file
        path: PathBuf,
        /// Identifier the source must declare, when re-resolving a manifest entry
        expected: Option<ProfileId>,
    },
    /// A profile published in the store.
    Store {
        /// Profile identifier
        id: ProfileId,
        /// Exact version; latest when `None`
        version: Option<String>,
    },
}

impl InstallRequest {
    /// Request for a local source file.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::Local {
            path: path.into(),
            expected: None,
        }
    }

    /// Request for a store profile.
    #[must_use]
    pub const fn store(id: ProfileId, version: Option<String>) -> Self {
        Self::Store {
            id,
            version,
        }
    }
}

impl fmt::Display for InstallRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local {
                path,
                ..
            } => write!(f, "{}", path.display()),
            Self::Store {
                id,
                version: Some(version),
            } => write!(f, "{id}@{version}"),
            Self::Store {
                id,
                version: None,
            } => write!(f, "{id}"),
        }
    }
}

/// A request to install one provider alongside the requested profiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderRequest {
    /// A provider resolved from the store.
    Store {
        /// Provider name
        name: String,
    },
    /// A local provider definition file.
    Local {
        /// Provider name, taken from the file stem
        name: String,
        /// Path of the `.json` definition
        path: PathBuf,
    },
}

impl ProviderRequest {
    /// Interpret one `--providers` item.
    ///
    /// Items containing a path separator or ending in `.json` are local
    /// definitions named after their file stem; anything else is a store
    /// provider name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use superface_cli::resolver::ProviderRequest;
    ///
    /// assert_eq!(ProviderRequest::parse("swapi").unwrap().name(), "swapi");
    /// assert_eq!(ProviderRequest::parse("providers/mock.json").unwrap().name(), "mock");
    /// assert!(ProviderRequest::parse("Bad Name").is_err());
    /// ```
    pub fn parse(item: &str) -> Result<Self, SuperfaceError> {
        let item = item.trim();
        let looks_like_path = item.contains('/') || item.contains('\\') || item.ends_with(".json");

        if looks_like_path {
            let path = PathBuf::from(item);
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_default();
            validate_provider_name(&name)?;
            Ok(Self::Local {
                name,
                path,
            })
        } else {
            validate_provider_name(item)?;
            Ok(Self::Store {
                name: item.to_string(),
            })
        }
    }

    /// Provider name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Store {
                name,
            }
            | Self::Local {
                name,
                ..
            } => name,
        }
    }

    /// Make a relative local path absolute against `base`.
    #[must_use]
    pub fn rooted_at(self, base: &Path) -> Self {
        match self {
            Self::Local {
                name,
                path,
            } if path.is_relative() => Self::Local {
                name,
                path: base.join(path),
            },
            other => other,
        }
    }
}

/// What a profile entry should contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProfile {
    /// Profile identifier
    pub id: ProfileId,
    /// Source designation to record
    pub source: ProfileSource,
}

/// What a top-level provider entry should contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProvider {
    /// Provider name
    pub name: String,
    /// Source designation to record
    pub source: ProviderSource,
}

/// Resolves install requests and loads documents for check.
pub struct SourceResolver {
    store: Arc<dyn StoreClient>,
    validator: Arc<dyn DocumentValidator>,
    manifest_dir: PathBuf,
    provider_cache: DashMap<String, ProviderDefinition>,
}

impl SourceResolver {
    /// Create a resolver for a manifest living in `manifest_dir`.
    pub fn new(
        store: Arc<dyn StoreClient>,
        validator: Arc<dyn DocumentValidator>,
        manifest_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            validator,
            manifest_dir: manifest_dir.into(),
            provider_cache: DashMap::new(),
        }
    }

    /// Directory that stored `file` values are relative to.
    #[must_use]
    pub fn manifest_dir(&self) -> &Path {
        &self.manifest_dir
    }

    /// The document collaborator.
    #[must_use]
    pub fn validator(&self) -> &dyn DocumentValidator {
        self.validator.as_ref()
    }

    /// Manifest `file` value for an absolute path.
    #[must_use]
    pub fn storage_path(&self, path: &Path) -> String {
        normalize_path_for_storage(relative_path(&self.manifest_dir, path))
    }

    /// Absolute path for a manifest `file` value.
    #[must_use]
    pub fn local_path(&self, file: &str) -> PathBuf {
        normalize_path(&self.manifest_dir.join(file))
    }

    /// Determine the profile entry an install request produces.
    pub async fn resolve_profile(
        &self,
        request: &InstallRequest,
    ) -> Result<ResolvedProfile, SuperfaceError> {
        match request {
            InstallRequest::Local {
                path,
                expected,
            } => {
                let content = read_local(path, "profile source").await?;
                let document = self.validator.parse_profile(&content, &path.display().to_string())?;

                if let Some(expected) = expected {
                    if &document.id != expected {
                        return Err(SuperfaceError::SyntaxError {
                            origin: path.display().to_string(),
                            reason: format!(
                                "declares profile \"{}\" but the manifest records it as \"{expected}\"",
                                document.id
                            ),
                        });
                    }
                }

                let file = self.storage_path(path);
                debug!("Resolved {} to local profile {} ({file})", path.display(), document.id);
                Ok(ResolvedProfile {
                    id: document.id,
                    source: ProfileSource::Local {
                        file,
                    },
                })
            }
            InstallRequest::Store {
                id,
                version,
            } => {
                let version = match version {
                    Some(version) => {
                        let version = validate_version(version)?;
                        self.store.fetch_profile_source(id, &version).await?;
                        version
                    }
                    None => self.store.fetch_latest_version(id).await?,
                };
                debug!("Resolved {id} to store version {version}");
                Ok(ResolvedProfile {
                    id: id.clone(),
                    source: ProfileSource::Store {
                        version,
                    },
                })
            }
        }
    }

    /// Determine the provider entry a provider request produces.
    pub async fn resolve_provider(
        &self,
        request: &ProviderRequest,
    ) -> Result<ResolvedProvider, SuperfaceError> {
        let name = request.name();
        validate_provider_name(name)?;

        let source = match request {
            ProviderRequest::Local {
                path,
                ..
            } => {
                let content = read_local(path, "provider definition").await?;
                let definition = ProviderDefinition::from_json(&content, &path.display().to_string())?;
                if definition.name != name {
                    tracing::warn!(
                        "Provider definition {} is named \"{}\", installing it as \"{name}\"",
                        path.display(),
                        definition.name
                    );
                }
                ProviderSource::Local {
                    file: self.storage_path(path),
                }
            }
            ProviderRequest::Store {
                ..
            } => {
                self.provider_definition(name).await?;
                ProviderSource::Store
            }
        };

        Ok(ResolvedProvider {
            name: name.to_string(),
            source,
        })
    }

    /// Load and parse the profile document behind a manifest source.
    pub async fn load_profile(
        &self,
        id: &ProfileId,
        source: &ProfileSource,
    ) -> Result<ProfileDocument, SuperfaceError> {
        match source {
            ProfileSource::Local {
                file,
            } => {
                let path = self.local_path(file);
                let content = read_local(&path, "profile source").await?;
                self.validator.parse_profile(&content, &path.display().to_string())
            }
            ProfileSource::Store {
                version,
            } => {
                let content = self.store.fetch_profile_source(id, version).await?;
                self.validator.parse_profile(&content, &format!("{id}@{version}"))
            }
        }
    }

    /// Load and parse the map bound to `provider` under profile `id`.
    ///
    /// `profile_version` addresses store maps and is ignored for local ones.
    pub async fn load_map(
        &self,
        id: &ProfileId,
        profile_version: &str,
        provider: &str,
        binding: &BindingSource,
    ) -> Result<MapDocument, SuperfaceError> {
        match binding {
            BindingSource::Local {
                file,
            } => {
                let path = self.local_path(file);
                let content = read_local(&path, "map source").await?;
                self.validator.parse_map(&content, &path.display().to_string())
            }
            BindingSource::Store {
                map_variant,
                ..
            } => {
                let address = MapAddress {
                    profile: id.clone(),
                    version: profile_version.to_string(),
                    provider: provider.to_string(),
                    variant: map_variant.clone(),
                };
                let content = self.store.fetch_map_source(&address).await?;
                self.validator.parse_map(&content, &address.to_string())
            }
        }
    }

    /// Load the provider definition behind a manifest source.
    pub async fn load_provider(
        &self,
        name: &str,
        source: &ProviderSource,
    ) -> Result<ProviderDefinition, SuperfaceError> {
        match source {
            ProviderSource::Local {
                file,
            } => {
                let path = self.local_path(file);
                let content = read_local(&path, "provider definition").await?;
                ProviderDefinition::from_json(&content, &path.display().to_string())
            }
            ProviderSource::Store => self.provider_definition(name).await,
        }
    }

    /// Store provider definition, fetched at most once per resolver.
    pub async fn provider_definition(&self, name: &str) -> Result<ProviderDefinition, SuperfaceError> {
        if let Some(cached) = self.provider_cache.get(name) {
            return Ok(cached.value().clone());
        }
        let definition = self.store.fetch_provider_definition(name).await?;
        self.provider_cache.insert(name.to_string(), definition.clone());
        Ok(definition)
    }
}

/// Read a local source file, mapping a missing file to [`SuperfaceError::NotFound`].
async fn read_local(path: &Path, what: &str) -> Result<String, SuperfaceError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SuperfaceError::not_found(what, path.display().to_string()))
        }
        Err(e) => Err(SuperfaceError::IoError(e)),
    }
}

#[cfg(test)]
mod tests;
