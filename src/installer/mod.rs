//! Install engine: resolve a batch of requests and merge them into the manifest.
//!
//! # Algorithm
//!
//! 1. **Fan out**: every provider request and every profile request is
//!    resolved concurrently with `join_all`. Resolution has no side effects, so
//!    ordering does not matter yet.
//! 2. **Reduce**: results are merged into the manifest one item at a time, in
//!    request order, so conflict detection and reporting are deterministic.
//!    Each item is merged into a draft of the document and only committed when
//!    all of its merges (profile, providers, bindings) succeed.
//! 3. **Persist**: the manifest is written once, and only when at least one item
//!    succeeded.
//!
//! A failing item never aborts its siblings. Fatal errors are limited to the
//! final write.

use crate::core::{ProfileId, SuperfaceError};
use crate::manifest::{BindingSource, ManifestDocument, ManifestFile, ProfileSource};
use crate::resolver::{InstallRequest, ProviderRequest, ResolvedProfile, ResolvedProvider, SourceResolver};
use anyhow::Result;
use futures::future::join_all;
use tracing::{debug, info};

/// Install flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// Replace entries installed from a different source
    pub force: bool,
}

/// Result of one install item.
#[derive(Debug, Clone)]
pub enum InstallStatus {
    /// The manifest changed for this item.
    Installed,
    /// Everything was already installed from the same sources.
    Unchanged,
    /// The item failed; the manifest was not touched for it.
    Failed(SuperfaceError),
}

/// Outcome of one install request.
#[derive(Debug, Clone)]
pub struct ItemOutcome {
    /// The request as the user wrote it
    pub request: String,
    /// Resolved profile identifier, when resolution got that far
    pub profile: Option<ProfileId>,
    /// Resolved source, when resolution got that far
    pub source: Option<ProfileSource>,
    /// Item status
    pub status: InstallStatus,
}

impl ItemOutcome {
    /// Whether the item succeeded.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        !matches!(self.status, InstallStatus::Failed(_))
    }
}

/// Outcome of an install batch.
#[derive(Debug, Clone, Default)]
pub struct InstallOutcome {
    /// Number of items that succeeded (installed or unchanged)
    pub installed_count: usize,
    /// Per-item outcomes in request order
    pub items: Vec<ItemOutcome>,
    /// Whether the manifest was written
    pub persisted: bool,
}

impl InstallOutcome {
    /// Failed items in request order.
    pub fn failures(&self) -> impl Iterator<Item = (&ItemOutcome, &SuperfaceError)> {
        self.items.iter().filter_map(|item| match &item.status {
            InstallStatus::Failed(error) => Some((item, error)),
            _ => None,
        })
    }

    /// Exit code: 0 when everything succeeded, else the code of the first failure.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.failures().next().map_or(0, |(_, error)| error.exit_code())
    }
}

/// Orchestrates resolution and merging of install batches.
pub struct InstallEngine {
    resolver: SourceResolver,
}

impl InstallEngine {
    /// Create an engine using `resolver` for all lookups.
    #[must_use]
    pub const fn new(resolver: SourceResolver) -> Self {
        Self {
            resolver,
        }
    }

    /// Requests re-resolving every profile already in the manifest from its recorded source.
    #[must_use]
    pub fn requests_from_manifest(&self, document: &ManifestDocument) -> Vec<InstallRequest> {
        document
            .profiles
            .iter()
            .map(|(id, entry)| match &entry.source {
                ProfileSource::Local {
                    file,
                } => InstallRequest::Local {
                    path: self.resolver.local_path(file),
                    expected: Some(id.clone()),
                },
                ProfileSource::Store {
                    version,
                } => InstallRequest::store(id.clone(), Some(version.clone())),
            })
            .collect()
    }

    /// Install `requests`, binding every provider in `providers` to each profile.
    ///
    /// # Errors
    ///
    /// Only persisting the manifest can fail the whole batch; per-item failures
    /// are reported in [`InstallOutcome::items`].
    pub async fn install(
        &self,
        manifest: &mut ManifestFile,
        requests: &[InstallRequest],
        providers: &[ProviderRequest],
        options: InstallOptions,
    ) -> Result<InstallOutcome> {
        if requests.is_empty() {
            debug!("Nothing to install");
            return Ok(InstallOutcome::default());
        }

        let (resolved_providers, resolved_profiles) = futures::join!(
            join_all(providers.iter().map(|p| self.resolver.resolve_provider(p))),
            join_all(requests.iter().map(|r| self.resolver.resolve_profile(r)))
        );

        let mut outcome = InstallOutcome::default();
        for (request, resolved) in requests.iter().zip(resolved_profiles) {
            let item = match resolved {
                Ok(profile) => {
                    let status = match merge_item(
                        &mut manifest.document,
                        &profile,
                        &resolved_providers,
                        options,
                    ) {
                        Ok(true) => InstallStatus::Installed,
                        Ok(false) => InstallStatus::Unchanged,
                        Err(error) => InstallStatus::Failed(error),
                    };
                    ItemOutcome {
                        request: request.to_string(),
                        profile: Some(profile.id),
                        source: Some(profile.source),
                        status,
                    }
                }
                Err(error) => ItemOutcome {
                    request: request.to_string(),
                    profile: None,
                    source: None,
                    status: InstallStatus::Failed(error),
                },
            };

            match &item.status {
                InstallStatus::Failed(error) => debug!("Install of {} failed: {error}", item.request),
                status => debug!("Install of {}: {status:?}", item.request),
            }
            if item.succeeded() {
                outcome.installed_count += 1;
            }
            outcome.items.push(item);
        }

        if outcome.installed_count > 0 {
            manifest.persist()?;
            outcome.persisted = true;
        } else {
            info!("No profiles installed, leaving {} untouched", manifest.path().display());
        }

        Ok(outcome)
    }
}

/// Merge one resolved profile and its provider bindings into `document`.
///
/// Works on a draft so a failure leaves `document` untouched. Returns whether
/// anything changed.
fn merge_item(
    document: &mut ManifestDocument,
    profile: &ResolvedProfile,
    providers: &[Result<ResolvedProvider, SuperfaceError>],
    options: InstallOptions,
) -> Result<bool, SuperfaceError> {
    let mut draft = document.clone();
    let mut changed = draft.merge_profile(&profile.id, profile.source.clone(), options.force)?.is_change();

    for provider in providers {
        let provider = provider.as_ref().map_err(SuperfaceError::clone)?;
        changed |= draft.merge_provider(&provider.name, provider.source.clone(), options.force)?.is_change();
        changed |= draft
            .merge_profile_provider(
                &profile.id,
                &provider.name,
                BindingSource::store_default(),
                options.force,
            )?
            .is_change();
    }

    *document = draft;
    Ok(changed)
}
