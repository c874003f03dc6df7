//! Install profiles and providers into `super.json`.
//!
//! # Examples
//!
//! ```bash
//! # Latest published version
//! superface install starwars/character-information
//!
//! # Pinned version with two providers, one of them a local definition
//! superface install starwars/character-information@1.0.2 --providers swapi,providers/mock.json
//!
//! # Local profile source; the identifier is read from the file header
//! superface install --local profiles/character.supr
//!
//! # Re-resolve everything already recorded in super.json
//! superface install
//! ```
//!
//! Arguments are validated before any file is read or request is made. Items
//! fail independently; the exit code is the one of the first failed item.

use crate::cli::common::{build_resolver, working_dir};
use crate::core::{ProfileRef, SuperfaceError};
use crate::installer::{InstallEngine, InstallOptions};
use crate::manifest::{ManifestFile, ScanLevels};
use crate::report::format_install_summary;
use crate::resolver::{InstallRequest, ProviderRequest};
use crate::utils::progress::Spinner;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;

/// Command to install profiles and providers.
#[derive(Args, Debug)]
pub struct InstallCommand {
    /// Profile to install: `<profileId>[@<version>]`, or a path with `--local`
    ///
    /// When omitted, every profile already recorded in super.json is
    /// re-resolved from its recorded source.
    #[arg(value_name = "PROFILE")]
    pub(super) profile: Option<String>,

    /// Providers to install and bind to the profile (comma-separated)
    ///
    /// Items containing a path separator or ending in `.json` are local
    /// provider definitions named after their file stem.
    #[arg(short, long, value_delimiter = ',', value_name = "PROVIDERS")]
    pub(super) providers: Vec<String>,

    /// Replace entries installed from a different source
    #[arg(short, long)]
    pub(super) force: bool,

    /// Treat PROFILE as a path to a local profile source
    #[arg(short, long, requires = "profile")]
    pub(super) local: bool,

    /// Number of parent directories to search for super.json (0-5)
    #[arg(short, long, default_value_t = 0, value_name = "LEVELS")]
    pub(super) scan: usize,
}

impl InstallCommand {
    fn profile_request(&self, cwd: &Path) -> Result<Option<InstallRequest>> {
        let Some(profile) = &self.profile else {
            return Ok(None);
        };

        if self.local {
            return Ok(Some(InstallRequest::local(cwd.join(profile))));
        }

        let reference: ProfileRef = profile.parse()?;
        Ok(Some(InstallRequest::store(reference.id, reference.version)))
    }

    /// Run the install and return the exit code.
    pub async fn execute(self, quiet: bool) -> Result<i32> {
        let scan = ScanLevels::new(self.scan)?;
        let cwd = working_dir()?;
        let requested = self.profile_request(&cwd)?;
        let providers = self
            .providers
            .iter()
            .filter(|item| !item.trim().is_empty())
            .map(|item| ProviderRequest::parse(item).map(|p| p.rooted_at(&cwd)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut manifest = ManifestFile::open(&cwd, scan.get())?;
        let engine = InstallEngine::new(build_resolver(&manifest)?);

        let requests = match requested {
            Some(request) => vec![request],
            None => engine.requests_from_manifest(&manifest.document),
        };
        if requests.is_empty() && !providers.is_empty() {
            return Err(SuperfaceError::not_found(
                "Profiles to bind providers to",
                manifest.path().display().to_string(),
            )
            .into());
        }

        let spinner = Spinner::new(format!("Installing {} profile(s)", requests.len()), quiet);
        let outcome = engine
            .install(
                &mut manifest,
                &requests,
                &providers,
                InstallOptions {
                    force: self.force,
                },
            )
            .await;
        spinner.finish_and_clear();
        let outcome = outcome?;

        if quiet {
            for (item, error) in outcome.failures() {
                eprintln!("{} {}: {error}", "✗".red(), item.request);
            }
        } else {
            print!("{}", format_install_summary(&outcome));
        }

        Ok(outcome.exit_code())
    }
}
