//! Rendering of install and check outcomes.
//!
//! Human output uses the usual markers: `✓` for success, `✗` for errors and
//! failed items, `⚠` for warnings. JSON output is the serialized
//! [`CheckResult`] list and nothing else, so it can be piped.

use crate::checker::{CheckIssue, CheckResult, CheckSummary, IssueKind, Provenance};
use crate::installer::{InstallOutcome, InstallStatus};
use colored::Colorize;
use std::fmt::Write as _;

fn describe(provenance: &Provenance) -> String {
    match provenance {
        Provenance::Local {
            path,
        } => format!("local file {path}"),
        Provenance::Remote {
            version: Some(version),
        } => format!("remote version {version}"),
        Provenance::Remote {
            version: None,
        } => "remote".to_string(),
    }
}

fn issue_line(out: &mut String, issue: &CheckIssue) {
    let _ = match issue.kind {
        IssueKind::Error => writeln!(out, "    {} {}", "✗".red(), issue.message),
        IssueKind::Warn => writeln!(out, "    {} {}", "⚠".yellow(), issue.message),
    };
}

/// Human-readable check report.
#[must_use]
pub fn format_check_human(results: &[CheckResult]) -> String {
    let mut out = String::new();

    for result in results {
        let (marker, headline) = match result {
            CheckResult::ProfileMap {
                profile_id,
                provider,
                profile,
                map,
                ..
            } => (
                result.issues(),
                format!(
                    "Profile \"{profile_id}\" ({}) against map for \"{provider}\" ({})",
                    describe(profile),
                    describe(map)
                ),
            ),
            CheckResult::MapProvider {
                provider,
                map,
                provider_source,
                ..
            } => (
                result.issues(),
                format!(
                    "Map for \"{provider}\" ({}) against provider \"{provider}\" ({})",
                    describe(map),
                    describe(provider_source)
                ),
            ),
        };

        let marker = if marker.iter().any(|i| i.kind == IssueKind::Error) {
            "✗".red()
        } else if marker.is_empty() {
            "✓".green()
        } else {
            "⚠".yellow()
        };
        let _ = writeln!(out, "{marker} {headline}");
        for issue in result.issues() {
            issue_line(&mut out, issue);
        }
    }

    let summary = CheckSummary::from_results(results);
    let _ = if summary.errors == 0 && summary.warnings == 0 {
        writeln!(out, "\n{} No issues found", "✓".green())
    } else {
        writeln!(
            out,
            "\nCheck finished with {} error(s) and {} warning(s)",
            summary.errors, summary.warnings
        )
    };

    out
}

/// Machine-readable check report.
pub fn format_check_json(results: &[CheckResult]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(results)
}

/// Human-readable install summary.
#[must_use]
pub fn format_install_summary(outcome: &InstallOutcome) -> String {
    let mut out = String::new();

    if outcome.items.is_empty() {
        let _ = writeln!(out, "No profiles to install");
        return out;
    }

    for item in &outcome.items {
        let label = match (&item.profile, &item.source) {
            (Some(profile), Some(source)) => format!("{profile} ({source})"),
            _ => item.request.clone(),
        };
        let _ = match &item.status {
            InstallStatus::Installed => writeln!(out, "{} Installed {label}", "✓".green()),
            InstallStatus::Unchanged => writeln!(out, "{} {label} is already installed", "✓".green()),
            InstallStatus::Failed(error) => writeln!(out, "{} {label}: {error}", "✗".red()),
        };
    }

    let failed = outcome.items.len() - outcome.installed_count;
    let _ = if outcome.installed_count == 0 {
        writeln!(out, "\nNo profiles installed")
    } else if failed > 0 {
        writeln!(
            out,
            "\nInstalled {} of {} profile(s), {failed} failed",
            outcome.installed_count,
            outcome.items.len()
        )
    } else {
        writeln!(out, "\nInstalled {} profile(s)", outcome.installed_count)
    };

    out
}
