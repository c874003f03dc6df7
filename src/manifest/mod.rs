//! Manifest (`superface/super.json`) parsing, merging, and persistence.
//!
//! The manifest records which profiles, providers, and profile-provider
//! bindings are installed in a project, each backed either by a local file or
//! by a version in the remote store.
//!
//! # File Format
//!
//! ```json
//! {
//!   "profiles": {
//!     "starwars/character-information": {
//!       "version": "1.0.2",
//!       "priority": ["swapi"],
//!       "providers": {
//!         "swapi": {}
//!       }
//!     },
//!     "local/profile": {
//!       "file": "../profiles/profile.supr",
//!       "providers": {
//!         "swapi": { "file": "../maps/profile.swapi.suma" }
//!       }
//!     }
//!   },
//!   "providers": {
//!     "swapi": {}
//!   }
//! }
//! ```
//!
//! On load, string shorthands (`"1.0.2"`, `"file:../x.supr"`) are collapsed
//! into the same tagged [`ProfileSource`], [`ProviderSource`] and
//! [`BindingSource`] variants, so no call site ever re-checks which keys an
//! entry happens to carry. Keys this crate does not interpret (`security`,
//! `parameters`, `defaults`, ...) are carried through load/save untouched.
//!
//! # Invariants
//!
//! - A profile entry has exactly one source: a `file` or a `version`.
//! - `file` values are stored relative to the manifest directory with forward slashes.
//! - A binding under a profile may only be created when the provider also has a
//!   top-level entry ([`ManifestDocument::merge_profile_provider`]).

pub mod locator;


pub use locator::{ScanLevels, locate, manifest_path_in};

use crate::constants::FILE_URI_PREFIX;
use crate::core::{ProfileId, SuperfaceError, validate_version};
use crate::utils::fs::safe_write;
use crate::utils::{normalize_path, normalize_path_for_storage};
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a profile's source document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSource {
    /// A local `.supr` file, relative to the manifest directory.
    Local {
        /// Relative path with forward slashes
        file: String,
    },
    /// An exact version published in the store.
    Store {
        /// Exact semantic version
        version: String,
    },
}

impl fmt::Display for ProfileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local {
                file,
            } => write!(f, "file {file}"),
            Self::Store {
                version,
            } => write!(f, "version {version}"),
        }
    }
}

/// Where a provider definition comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderSource {
    /// A local provider definition (`.json`), relative to the manifest directory.
    Local {
        /// Relative path with forward slashes
        file: String,
    },
    /// Resolved from the store at use time.
    Store,
}

impl fmt::Display for ProviderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local {
                file,
            } => write!(f, "file {file}"),
            Self::Store => write!(f, "store"),
        }
    }
}

/// Where the map binding one profile to one provider comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingSource {
    /// A local `.suma` file, relative to the manifest directory.
    Local {
        /// Relative path with forward slashes
        file: String,
    },
    /// A map published in the store for the profile's version.
    Store {
        /// Map variant, when not the default one
        map_variant: Option<String>,
        /// Map revision, when pinned
        map_revision: Option<String>,
    },
}

impl BindingSource {
    /// The default store binding (no variant, no revision).
    #[must_use]
    pub const fn store_default() -> Self {
        Self::Store {
            map_variant: None,
            map_revision: None,
        }
    }
}

impl fmt::Display for BindingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local {
                file,
            } => write!(f, "file {file}"),
            Self::Store {
                map_variant: None,
                map_revision: None,
            } => write!(f, "store"),
            Self::Store {
                map_variant,
                map_revision,
            } => {
                write!(f, "store")?;
                if let Some(variant) = map_variant {
                    write!(f, " variant {variant}")?;
                }
                if let Some(revision) = map_revision {
                    write!(f, " revision {revision}")?;
                }
                Ok(())
            }
        }
    }
}

/// A profile-provider binding.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileProviderEntry {
    /// Map source
    pub source: BindingSource,
    /// Keys carried through untouched (`defaults`, ...)
    pub extra: Map<String, Value>,
}

impl ProfileProviderEntry {
    /// Binding with the given source and no extra keys.
    #[must_use]
    pub fn new(source: BindingSource) -> Self {
        Self {
            source,
            extra: Map::new(),
        }
    }
}

/// An installed profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileEntry {
    /// Profile source
    pub source: ProfileSource,
    /// Bindings of this profile, keyed by provider name
    pub providers: BTreeMap<String, ProfileProviderEntry>,
    /// Provider failover order
    pub priority: Vec<String>,
    /// Keys carried through untouched
    pub extra: Map<String, Value>,
}

impl ProfileEntry {
    /// Profile with the given source and no bindings.
    #[must_use]
    pub fn new(source: ProfileSource) -> Self {
        Self {
            source,
            providers: BTreeMap::new(),
            priority: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// A top-level provider entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderEntry {
    /// Provider definition source
    pub source: ProviderSource,
    /// Keys carried through untouched (`security`, `parameters`, ...)
    pub extra: Map<String, Value>,
}

impl ProviderEntry {
    /// Provider with the given source and no extra keys.
    #[must_use]
    pub fn new(source: ProviderSource) -> Self {
        Self {
            source,
            extra: Map::new(),
        }
    }
}

/// Result of merging one entry into the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The entry did not exist and was created.
    Added,
    /// The entry already had the same source; nothing changed.
    Unchanged,
    /// The entry had a different source and `force` replaced it.
    Replaced,
}

impl MergeOutcome {
    /// Whether the manifest content changed.
    #[must_use]
    pub const fn is_change(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// In-memory representation of `super.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestDocument {
    /// Installed profiles
    #[serde(default)]
    pub profiles: BTreeMap<ProfileId, ProfileEntry>,
    /// Installed providers
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderEntry>,
    /// Top-level keys carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ManifestDocument {
    /// Create an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a manifest from JSON text. `origin` labels errors.
    pub fn from_json(content: &str, origin: &str) -> Result<Self, SuperfaceError> {
        serde_json::from_str(content).map_err(|e| SuperfaceError::ManifestLoadError {
            file: origin.to_string(),
            reason: e.to_string(),
        })
    }

    /// Serialize as indented JSON with a trailing newline.
    pub fn to_json_pretty(&self) -> Result<String, SuperfaceError> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        Ok(content)
    }

    /// Load a manifest file from disk.
    ///
    /// # Errors
    ///
    /// - I/O errors reading the file
    /// - [`SuperfaceError::ManifestLoadError`] for malformed content
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest file: {}", path.display()))?;

        let document = Self::from_json(&content, &path.display().to_string())?;

        for (profile, provider) in document.dangling_bindings() {
            tracing::warn!(
                "Profile \"{profile}\" binds provider \"{provider}\" which has no top-level entry"
            );
        }

        Ok(document)
    }

    /// Save the manifest atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_json_pretty()?;
        safe_write(path, &content)
            .with_context(|| format!("Failed to write manifest file: {}", path.display()))
    }

    /// Look up a profile entry.
    #[must_use]
    pub fn profile(&self, id: &ProfileId) -> Option<&ProfileEntry> {
        self.profiles.get(id)
    }

    /// Look up a top-level provider entry.
    #[must_use]
    pub fn provider(&self, name: &str) -> Option<&ProviderEntry> {
        self.providers.get(name)
    }

    /// Merge a profile source.
    ///
    /// Same source is a no-op; a different source is an
    /// [`SuperfaceError::AlreadyInstalledConflict`] unless `force` is set, in
    /// which case the source designation is replaced and existing bindings are kept.
    pub fn merge_profile(
        &mut self,
        id: &ProfileId,
        source: ProfileSource,
        force: bool,
    ) -> Result<MergeOutcome, SuperfaceError> {
        match self.profiles.get_mut(id) {
            None => {
                self.profiles.insert(id.clone(), ProfileEntry::new(source));
                Ok(MergeOutcome::Added)
            }
            Some(entry) if entry.source == source => Ok(MergeOutcome::Unchanged),
            Some(entry) if force => {
                entry.source = source;
                Ok(MergeOutcome::Replaced)
            }
            Some(entry) => Err(SuperfaceError::AlreadyInstalledConflict {
                kind: "Profile".to_string(),
                name: id.to_string(),
                existing: entry.source.to_string(),
                requested: source.to_string(),
            }),
        }
    }

    /// Merge a top-level provider source, with the same rules as [`Self::merge_profile`].
    pub fn merge_provider(
        &mut self,
        name: &str,
        source: ProviderSource,
        force: bool,
    ) -> Result<MergeOutcome, SuperfaceError> {
        match self.providers.get_mut(name) {
            None => {
                self.providers.insert(name.to_string(), ProviderEntry::new(source));
                Ok(MergeOutcome::Added)
            }
            Some(entry) if entry.source == source => Ok(MergeOutcome::Unchanged),
            Some(entry) if force => {
                entry.source = source;
                Ok(MergeOutcome::Replaced)
            }
            Some(entry) => Err(SuperfaceError::AlreadyInstalledConflict {
                kind: "Provider".to_string(),
                name: name.to_string(),
                existing: entry.source.to_string(),
                requested: source.to_string(),
            }),
        }
    }

    /// Merge a binding of `provider` under profile `id`.
    ///
    /// The profile and the top-level provider entry must already exist. New
    /// bindings are appended to the profile's `priority` list.
    pub fn merge_profile_provider(
        &mut self,
        id: &ProfileId,
        provider: &str,
        source: BindingSource,
        force: bool,
    ) -> Result<MergeOutcome, SuperfaceError> {
        if !self.providers.contains_key(provider) {
            return Err(SuperfaceError::ProviderNotFoundInManifest {
                provider: provider.to_string(),
            });
        }
        let profile = self.profiles.get_mut(id).ok_or_else(|| SuperfaceError::NotFoundInManifest {
            profile: id.to_string(),
        })?;

        let outcome = match profile.providers.get_mut(provider) {
            None => {
                profile
                    .providers
                    .insert(provider.to_string(), ProfileProviderEntry::new(source));
                MergeOutcome::Added
            }
            Some(entry) if entry.source == source => MergeOutcome::Unchanged,
            Some(entry) if force => {
                entry.source = source;
                MergeOutcome::Replaced
            }
            Some(entry) => {
                return Err(SuperfaceError::AlreadyInstalledConflict {
                    kind: "Provider binding".to_string(),
                    name: format!("{id}/{provider}"),
                    existing: entry.source.to_string(),
                    requested: source.to_string(),
                });
            }
        };

        if !profile.priority.iter().any(|p| p == provider) {
            profile.priority.push(provider.to_string());
        }

        Ok(outcome)
    }

    /// Bindings whose provider has no top-level entry.
    #[must_use]
    pub fn dangling_bindings(&self) -> Vec<(ProfileId, String)> {
        self.profiles
            .iter()
            .flat_map(|(id, entry)| {
                entry
                    .providers
                    .keys()
                    .filter(|provider| !self.providers.contains_key(*provider))
                    .map(move |provider| (id.clone(), provider.clone()))
            })
            .collect()
    }

    /// Every `(profile, bound provider)` pair, in manifest order.
    #[must_use]
    pub fn bindings(&self) -> Vec<(ProfileId, String)> {
        self.profiles
            .iter()
            .flat_map(|(id, entry)| {
                entry.providers.keys().map(move |provider| (id.clone(), provider.clone()))
            })
            .collect()
    }
}

/// A manifest document together with its location on disk.
#[derive(Debug, Clone)]
pub struct ManifestFile {
    path: PathBuf,
    existed: bool,
    /// The parsed document
    pub document: ManifestDocument,
}

impl ManifestFile {
    /// Locate the manifest from `start_dir`, or prepare a fresh one in `start_dir`.
    ///
    /// # Errors
    ///
    /// - [`SuperfaceError::InvalidScanLevel`] when `scan` exceeds the maximum
    /// - load errors when a manifest is found but cannot be parsed
    pub fn open(start_dir: &Path, scan: usize) -> Result<Self> {
        match locate(start_dir, scan)? {
            Some(project_dir) => Self::load(&manifest_path_in(&project_dir)),
            None => {
                tracing::debug!(
                    "No manifest within {scan} level(s) of {}, starting a fresh one",
                    start_dir.display()
                );
                Ok(Self::fresh(start_dir))
            }
        }
    }

    /// Load the manifest at an explicit path.
    pub fn load(path: &Path) -> Result<Self> {
        let document = ManifestDocument::load(path)?;
        tracing::debug!("Loaded manifest from {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            existed: true,
            document,
        })
    }

    /// An empty manifest that will be written under `project_dir`.
    #[must_use]
    pub fn fresh(project_dir: &Path) -> Self {
        Self {
            path: manifest_path_in(project_dir),
            existed: false,
            document: ManifestDocument::new(),
        }
    }

    /// Path of `super.json`.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing `super.json`; stored `file` values are relative to it.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Whether the manifest existed on disk when opened.
    #[must_use]
    pub const fn existed(&self) -> bool {
        self.existed
    }

    /// Absolute location of a stored relative `file` value.
    #[must_use]
    pub fn resolve_file(&self, file: &str) -> PathBuf {
        normalize_path(&self.dir().join(file))
    }

    /// Write the document back atomically.
    pub fn persist(&mut self) -> Result<()> {
        self.document.save(&self.path)?;
        self.existed = true;
        tracing::info!("Updated {}", self.path.display());
        Ok(())
    }
}

// Serialization: entries are read through `serde_json::Value` so shorthands
// and shape errors produce precise messages, then collapsed into the tagged
// source types.

fn parse_file_shorthand(raw: &str) -> Option<Result<String, String>> {
    raw.strip_prefix(FILE_URI_PREFIX).map(|rest| local_file(rest.strip_prefix("//").unwrap_or(rest)))
}

/// Brings a stored `file` value into its canonical form: relative, lexically
/// normalized, forward slashes. Hand-written manifests compare equal to the
/// paths this crate writes itself.
fn local_file(raw: &str) -> Result<String, String> {
    let unified = raw.replace('\\', "/");
    let has_drive = unified.len() >= 2
        && unified.as_bytes()[0].is_ascii_alphabetic()
        && unified.as_bytes()[1] == b':';
    if unified.starts_with('/') || has_drive {
        return Err(format!("file path \"{raw}\" must be relative to the manifest directory"));
    }

    let normalized = normalize_path_for_storage(normalize_path(Path::new(&unified)));
    if normalized.is_empty() {
        return Err(format!("file path \"{raw}\" does not name a file"));
    }
    Ok(normalized)
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawProfileEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    priority: Vec<String>,
    #[serde(default)]
    providers: BTreeMap<String, ProfileProviderEntry>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<Value> for ProfileEntry {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if let Value::String(raw) = &value {
            let source = match parse_file_shorthand(raw) {
                Some(file) => ProfileSource::Local {
                    file: file?,
                },
                None => ProfileSource::Store {
                    version: validate_version(raw).map_err(|e| e.to_string())?,
                },
            };
            return Ok(Self::new(source));
        }

        let raw: RawProfileEntry = serde_json::from_value(value).map_err(|e| e.to_string())?;
        let source = match (raw.file, raw.version) {
            (Some(file), None) => ProfileSource::Local {
                file: local_file(&file)?,
            },
            (None, Some(version)) => ProfileSource::Store {
                version: validate_version(&version).map_err(|e| e.to_string())?,
            },
            (Some(_), Some(_)) => {
                return Err("profile entry declares both \"file\" and \"version\"".to_string());
            }
            (None, None) => {
                return Err("profile entry declares neither \"file\" nor \"version\"".to_string());
            }
        };

        Ok(Self {
            source,
            providers: raw.providers,
            priority: raw.priority,
            extra: raw.extra,
        })
    }
}

impl<'de> Deserialize<'de> for ProfileEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}

impl Serialize for ProfileEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (file, version) = match &self.source {
            ProfileSource::Local {
                file,
            } => (Some(file.clone()), None),
            ProfileSource::Store {
                version,
            } => (None, Some(version.clone())),
        };
        RawProfileEntry {
            file,
            version,
            priority: self.priority.clone(),
            providers: self.providers.clone(),
            extra: self.extra.clone(),
        }
        .serialize(serializer)
    }
}

#[derive(Serialize, Deserialize, Default)]
struct RawProviderEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<Value> for ProviderEntry {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if let Value::String(raw) = &value {
            let file = parse_file_shorthand(raw)
                .ok_or_else(|| format!("provider shorthand must start with \"file:\", got \"{raw}\""))??;
            return Ok(Self::new(ProviderSource::Local {
                file,
            }));
        }

        let raw: RawProviderEntry = serde_json::from_value(value).map_err(|e| e.to_string())?;
        let source = match raw.file {
            Some(file) => ProviderSource::Local {
                file: local_file(&file)?,
            },
            None => ProviderSource::Store,
        };
        Ok(Self {
            source,
            extra: raw.extra,
        })
    }
}

impl<'de> Deserialize<'de> for ProviderEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}

impl Serialize for ProviderEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let file = match &self.source {
            ProviderSource::Local {
                file,
            } => Some(file.clone()),
            ProviderSource::Store => None,
        };
        RawProviderEntry {
            file,
            extra: self.extra.clone(),
        }
        .serialize(serializer)
    }
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawBindingEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    map_variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    map_revision: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<Value> for ProfileProviderEntry {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if let Value::String(raw) = &value {
            let file = parse_file_shorthand(raw)
                .ok_or_else(|| format!("binding shorthand must start with \"file:\", got \"{raw}\""))??;
            return Ok(Self::new(BindingSource::Local {
                file,
            }));
        }

        let raw: RawBindingEntry = serde_json::from_value(value).map_err(|e| e.to_string())?;
        let source = match raw.file {
            Some(_) if raw.map_variant.is_some() || raw.map_revision.is_some() => {
                return Err(
                    "binding declares \"file\" together with \"mapVariant\"/\"mapRevision\""
                        .to_string(),
                );
            }
            Some(file) => BindingSource::Local {
                file: local_file(&file)?,
            },
            None => BindingSource::Store {
                map_variant: raw.map_variant,
                map_revision: raw.map_revision,
            },
        };
        Ok(Self {
            source,
            extra: raw.extra,
        })
    }
}

impl<'de> Deserialize<'de> for ProfileProviderEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}

impl Serialize for ProfileProviderEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw = match &self.source {
            BindingSource::Local {
                file,
            } => RawBindingEntry {
                file: Some(file.clone()),
                extra: self.extra.clone(),
                ..RawBindingEntry::default()
            },
            BindingSource::Store {
                map_variant,
                map_revision,
            } => RawBindingEntry {
                file: None,
                map_variant: map_variant.clone(),
                map_revision: map_revision.clone(),
                extra: self.extra.clone(),
            },
        };
        raw.serialize(serializer)
    }
}
