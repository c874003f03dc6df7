//! Consistency check engine.
//!
//! For every requested profile/provider pair the engine locates three
//! documents (the profile, the map bound to the provider, and the provider
//! definition) and hands each adjacent pair to the [`DocumentValidator`]:
//!
//! ```text
//! profile ──profileMap── map ──mapProvider── provider
//! ```
//!
//! Every pair yields two [`CheckResult`]s, in request order.
//!
//! # Failure Model
//!
//! - Preconditions (profile in the manifest, provider bound under it, provider
//!   declared at the top level) are checked for *all* pairs before any file is
//!   read or any request is sent. A violation fails the whole check.
//! - A document that cannot be found or parsed becomes an error issue on the
//!   results it takes part in; the manifest disagrees with reality and that is
//!   exactly what check reports.
//! - A store outage ([`SuperfaceError::StoreUnavailable`]) is fatal.
//!
//! The engine never mutates the manifest.

use crate::core::error::{EXIT_CHECK_ERRORS, EXIT_CHECK_WARNINGS};
use crate::core::{ProfileId, SuperfaceError, validate_version};
use crate::document::{MapDocument, ProfileDocument, ProviderDefinition, ValidationReport};
use crate::manifest::{BindingSource, ManifestDocument, ProfileSource, ProviderSource};
use crate::resolver::SourceResolver;
use futures::future::join_all;
use serde::Serialize;
use tracing::debug;

/// A profile and the providers to check it against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckPair {
    /// Profile identifier
    pub profile: ProfileId,
    /// Providers bound under the profile
    pub providers: Vec<String>,
    /// Remote profile version to compare instead of the recorded one
    pub version: Option<String>,
}

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    /// Incompatibility
    Error,
    /// Suspicious but usable
    Warn,
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckIssue {
    /// Severity
    pub kind: IssueKind,
    /// Human-readable description
    pub message: String,
}

impl CheckIssue {
    fn error(message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::Error,
            message: message.into(),
        }
    }
}

/// Where a compared document came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Provenance {
    /// A local file, as recorded in the manifest
    Local {
        /// Path relative to the manifest directory
        path: String,
    },
    /// The store
    Remote {
        /// Profile version, when one applies
        #[serde(skip_serializing_if = "Option::is_none")]
        version: Option<String>,
    },
}

/// Result of comparing two adjacent documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CheckResult {
    /// Profile against the map implementing it
    ProfileMap {
        /// Profile identifier
        #[serde(rename = "profileId")]
        profile_id: ProfileId,
        /// Provider name
        provider: String,
        /// Profile provenance
        #[serde(rename = "profileSource")]
        profile: Provenance,
        /// Map provenance
        #[serde(rename = "mapSource")]
        map: Provenance,
        /// Findings in discovery order
        issues: Vec<CheckIssue>,
    },
    /// Map against the provider definition it targets
    MapProvider {
        /// Profile identifier
        #[serde(rename = "profileId")]
        profile_id: ProfileId,
        /// Provider name
        provider: String,
        /// Map provenance
        #[serde(rename = "mapSource")]
        map: Provenance,
        /// Provider provenance
        #[serde(rename = "providerSource")]
        provider_source: Provenance,
        /// Findings in discovery order
        issues: Vec<CheckIssue>,
    },
}

impl CheckResult {
    /// Findings of this result.
    #[must_use]
    pub fn issues(&self) -> &[CheckIssue] {
        match self {
            Self::ProfileMap {
                issues,
                ..
            }
            | Self::MapProvider {
                issues,
                ..
            } => issues,
        }
    }

    /// Drop warnings, keeping errors.
    pub fn retain_errors(&mut self) {
        match self {
            Self::ProfileMap {
                issues,
                ..
            }
            | Self::MapProvider {
                issues,
                ..
            } => issues.retain(|issue| issue.kind == IssueKind::Error),
        }
    }
}

/// Issue counts across a whole check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    /// Error-severity issues
    pub errors: usize,
    /// Warning-severity issues
    pub warnings: usize,
}

impl CheckSummary {
    /// Count issues in `results`.
    #[must_use]
    pub fn from_results(results: &[CheckResult]) -> Self {
        results.iter().flat_map(CheckResult::issues).fold(Self::default(), |mut summary, issue| {
            match issue.kind {
                IssueKind::Error => summary.errors += 1,
                IssueKind::Warn => summary.warnings += 1,
            }
            summary
        })
    }

    /// Exit code: errors win over warnings, warnings are ignored when `quiet`.
    #[must_use]
    pub const fn exit_code(&self, quiet: bool) -> i32 {
        if self.errors > 0 {
            EXIT_CHECK_ERRORS
        } else if self.warnings > 0 && !quiet {
            EXIT_CHECK_WARNINGS
        } else {
            0
        }
    }
}

/// Pairs covering every binding recorded in the manifest.
#[must_use]
pub fn pairs_from_manifest(document: &ManifestDocument) -> Vec<CheckPair> {
    document
        .profiles
        .iter()
        .filter(|(_, entry)| !entry.providers.is_empty())
        .map(|(id, entry)| CheckPair {
            profile: id.clone(),
            providers: entry.providers.keys().cloned().collect(),
            version: None,
        })
        .collect()
}

/// Sources of one pair after precondition checks.
struct PlannedPair {
    profile: ProfileId,
    source: ProfileSource,
    bindings: Vec<PlannedBinding>,
}

struct PlannedBinding {
    provider: String,
    binding: BindingSource,
    provider_source: ProviderSource,
}

/// Cross-references manifest entries against their documents.
pub struct CheckEngine {
    resolver: SourceResolver,
}

impl CheckEngine {
    /// Create an engine using `resolver` for all lookups.
    #[must_use]
    pub const fn new(resolver: SourceResolver) -> Self {
        Self {
            resolver,
        }
    }

    /// Check `pairs` against `document`.
    ///
    /// # Errors
    ///
    /// - [`SuperfaceError::NotFoundInManifest`], [`SuperfaceError::ProviderNotFoundInProfile`]
    ///   and [`SuperfaceError::ProviderNotFoundInManifest`] before any I/O
    /// - [`SuperfaceError::InvalidIdentifier`] for a malformed version override
    /// - [`SuperfaceError::StoreUnavailable`] when the store cannot be reached
    pub async fn check(
        &self,
        document: &ManifestDocument,
        pairs: &[CheckPair],
    ) -> Result<Vec<CheckResult>, SuperfaceError> {
        let planned = pairs.iter().map(|pair| plan(document, pair)).collect::<Result<Vec<_>, _>>()?;
        debug!("Checking {} profile(s)", planned.len());

        let checked = join_all(planned.iter().map(|pair| self.check_pair(pair))).await;

        let mut results = Vec::new();
        for pair in checked {
            results.extend(pair?);
        }
        Ok(results)
    }

    async fn check_pair(&self, pair: &PlannedPair) -> Result<Vec<CheckResult>, SuperfaceError> {
        let profile = fatal_only(self.resolver.load_profile(&pair.profile, &pair.source).await)?;
        let profile_provenance = provenance_of_profile(&pair.source);

        // Remote maps are addressed by the profile version
        let profile_version = match (&profile, &pair.source) {
            (Ok(document), _) => Some(document.version.to_string()),
            (
                Err(_),
                ProfileSource::Store {
                    version,
                },
            ) => Some(version.clone()),
            (Err(_), ProfileSource::Local { .. }) => None,
        };

        let bindings = join_all(pair.bindings.iter().map(|binding| {
            self.check_binding(pair, binding, &profile, &profile_provenance, profile_version.as_deref())
        }))
        .await;

        let mut results = Vec::with_capacity(bindings.len() * 2);
        for binding in bindings {
            results.extend(binding?);
        }
        Ok(results)
    }

    async fn check_binding(
        &self,
        pair: &PlannedPair,
        planned: &PlannedBinding,
        profile: &Result<ProfileDocument, SuperfaceError>,
        profile_provenance: &Provenance,
        profile_version: Option<&str>,
    ) -> Result<[CheckResult; 2], SuperfaceError> {
        let map_provenance = match &planned.binding {
            BindingSource::Local {
                file,
            } => Provenance::Local {
                path: file.clone(),
            },
            BindingSource::Store {
                ..
            } => Provenance::Remote {
                version: profile_version.map(str::to_string),
            },
        };
        let provider_provenance = match &planned.provider_source {
            ProviderSource::Local {
                file,
            } => Provenance::Local {
                path: file.clone(),
            },
            ProviderSource::Store => Provenance::Remote {
                version: None,
            },
        };

        let map: Result<MapDocument, SuperfaceError> = match (&planned.binding, profile_version) {
            (
                BindingSource::Store {
                    ..
                },
                None,
            ) => Err(SuperfaceError::Other {
                message: "the profile version is unknown, so the store map cannot be addressed"
                    .to_string(),
            }),
            (binding, version) => fatal_only(
                self.resolver
                    .load_map(&pair.profile, version.unwrap_or_default(), &planned.provider, binding)
                    .await,
            )?,
        };
        let provider: Result<ProviderDefinition, SuperfaceError> = fatal_only(
            self.resolver.load_provider(&planned.provider, &planned.provider_source).await,
        )?;

        let validator = self.resolver.validator();

        let mut profile_map_issues = Vec::new();
        if let Err(e) = profile {
            profile_map_issues.push(CheckIssue::error(format!("Unable to load profile: {e}")));
        }
        if let Err(e) = &map {
            profile_map_issues.push(CheckIssue::error(format!("Unable to load map: {e}")));
        }
        if let (Ok(profile), Ok(map)) = (profile, &map) {
            profile_map_issues.extend(issues_from(validator.validate_profile_map(profile, map)));
        }

        let mut map_provider_issues = Vec::new();
        if let Err(e) = &map {
            map_provider_issues.push(CheckIssue::error(format!("Unable to load map: {e}")));
        }
        if let Err(e) = &provider {
            map_provider_issues.push(CheckIssue::error(format!("Unable to load provider: {e}")));
        }
        if let (Ok(map), Ok(provider)) = (&map, &provider) {
            map_provider_issues.extend(issues_from(validator.validate_map_provider(map, provider)));
        }

        Ok([
            CheckResult::ProfileMap {
                profile_id: pair.profile.clone(),
                provider: planned.provider.clone(),
                profile: profile_provenance.clone(),
                map: map_provenance.clone(),
                issues: profile_map_issues,
            },
            CheckResult::MapProvider {
                profile_id: pair.profile.clone(),
                provider: planned.provider.clone(),
                map: map_provenance,
                provider_source: provider_provenance,
                issues: map_provider_issues,
            },
        ])
    }
}

/// Validate one pair against the manifest without touching the filesystem or the store.
fn plan(document: &ManifestDocument, pair: &CheckPair) -> Result<PlannedPair, SuperfaceError> {
    let entry = document.profile(&pair.profile).ok_or_else(|| SuperfaceError::NotFoundInManifest {
        profile: pair.profile.to_string(),
    })?;

    let mut bindings = Vec::with_capacity(pair.providers.len());
    for provider in &pair.providers {
        let binding = entry.providers.get(provider).ok_or_else(|| {
            SuperfaceError::ProviderNotFoundInProfile {
                profile: pair.profile.to_string(),
                provider: provider.clone(),
            }
        })?;
        let top_level = document.provider(provider).ok_or_else(|| {
            SuperfaceError::ProviderNotFoundInManifest {
                provider: provider.clone(),
            }
        })?;
        bindings.push(PlannedBinding {
            provider: provider.clone(),
            binding: binding.source.clone(),
            provider_source: top_level.source.clone(),
        });
    }

    let source = match (&entry.source, &pair.version) {
        (source, None) => source.clone(),
        (ProfileSource::Store { .. }, Some(version)) => ProfileSource::Store {
            version: validate_version(version)?,
        },
        (source @ ProfileSource::Local { .. }, Some(version)) => {
            tracing::warn!(
                "Profile \"{}\" is installed from a local file, ignoring version {version}",
                pair.profile
            );
            source.clone()
        }
    };

    Ok(PlannedPair {
        profile: pair.profile.clone(),
        source,
        bindings,
    })
}

fn provenance_of_profile(source: &ProfileSource) -> Provenance {
    match source {
        ProfileSource::Local {
            file,
        } => Provenance::Local {
            path: file.clone(),
        },
        ProfileSource::Store {
            version,
        } => Provenance::Remote {
            version: Some(version.clone()),
        },
    }
}

/// Split a load result into "fatal" (outer) and "becomes an issue" (inner).
fn fatal_only<T>(
    result: Result<T, SuperfaceError>,
) -> Result<Result<T, SuperfaceError>, SuperfaceError> {
    match result {
        Err(e @ SuperfaceError::StoreUnavailable { .. }) => Err(e),
        other => Ok(other),
    }
}

fn issues_from(report: ValidationReport) -> impl Iterator<Item = CheckIssue> {
    let errors = report.errors.into_iter().map(CheckIssue::error);
    let warnings = report.warnings.into_iter().map(|message| CheckIssue {
        kind: IssueKind::Warn,
        message,
    });
    errors.chain(warnings)
}
