//! Check installed profiles, maps and provider definitions for compatibility.
//!
//! # Examples
//!
//! ```bash
//! # Every bound provider of every profile in super.json
//! superface check
//!
//! # One profile against one provider, as JSON
//! superface check --profileId starwars/character-information --providerName swapi --json
//!
//! # Compare against another published profile version, errors only
//! superface check --profileId starwars/character-information --version 2.0.0 --quiet
//! ```
//!
//! `check` never writes the manifest. Exit codes: 0 clean, 4 when any error
//! was found, 5 when only warnings were found (never with `--quiet`).

use crate::checker::{CheckEngine, CheckPair, CheckResult, CheckSummary, pairs_from_manifest};
use crate::cli::common::{build_resolver, working_dir};
use crate::core::{ProfileId, SuperfaceError, validate_provider_name, validate_version};
use crate::manifest::{ManifestFile, ScanLevels};
use crate::report::{format_check_human, format_check_json};
use crate::utils::progress::Spinner;
use anyhow::Result;
use clap::Args;

/// Profile, provider and version override given on the command line.
type RequestedPair = (ProfileId, Option<String>, Option<String>);

/// Command to check installed sources.
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Profile to check; all profiles in super.json when omitted
    #[arg(long = "profileId", value_name = "PROFILE_ID")]
    pub(super) profile_id: Option<String>,

    /// Provider to check the profile against; all bound providers when omitted
    #[arg(long = "providerName", value_name = "PROVIDER", requires = "profile_id")]
    pub(super) provider_name: Option<String>,

    /// Remote profile version to compare instead of the recorded one
    #[arg(long, value_name = "VERSION", requires = "profile_id")]
    pub(super) version: Option<String>,

    /// Number of parent directories to search for super.json (0-5)
    #[arg(short, long, default_value_t = 0, value_name = "LEVELS")]
    pub(super) scan: usize,

    /// Print results as JSON
    #[arg(long)]
    pub(super) json: bool,
}

impl CheckCommand {
    /// Validate identifiers and build the explicitly requested pair, if any.
    fn requested_pair(&self) -> Result<Option<RequestedPair>, SuperfaceError> {
        let Some(profile_id) = &self.profile_id else {
            return Ok(None);
        };
        let profile = ProfileId::parse(profile_id)?;
        if let Some(provider) = &self.provider_name {
            validate_provider_name(provider)?;
        }
        let version = self.version.as_deref().map(validate_version).transpose()?;
        Ok(Some((profile, self.provider_name.clone(), version)))
    }

    /// Run the check and return the exit code.
    pub async fn execute(self, quiet: bool) -> Result<i32> {
        let scan = ScanLevels::new(self.scan)?;
        let requested = self.requested_pair()?;
        let cwd = working_dir()?;

        let manifest = ManifestFile::open(&cwd, scan.get())?;
        if !manifest.existed() {
            let location = manifest.path().display().to_string();
            return Err(SuperfaceError::not_found("super.json", location).into());
        }

        let pairs = match requested {
            Some((profile, provider, version)) => {
                let providers = match provider {
                    Some(provider) => vec![provider],
                    None => manifest
                        .document
                        .profile(&profile)
                        .map(|entry| entry.providers.keys().cloned().collect())
                        .unwrap_or_default(),
                };
                vec![CheckPair {
                    profile,
                    providers,
                    version,
                }]
            }
            None => pairs_from_manifest(&manifest.document),
        };

        let engine = CheckEngine::new(build_resolver(&manifest)?);
        let spinner = Spinner::new(format!("Checking {} profile(s)", pairs.len()), quiet || self.json);
        let results = engine.check(&manifest.document, &pairs).await;
        spinner.finish_and_clear();
        let mut results = results?;

        if quiet {
            results.iter_mut().for_each(CheckResult::retain_errors);
        }

        if self.json {
            println!("{}", format_check_json(&results)?);
        } else {
            print!("{}", format_check_human(&results));
        }

        Ok(CheckSummary::from_results(&results).exit_code(quiet))
    }
}
