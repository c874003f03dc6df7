//! Error handling for the Superface CLI
//!
//! This module provides the error taxonomy used by the manifest, resolver,
//! install and check layers, plus the user-facing [`ErrorContext`] wrapper
//! that renders fatal errors at the CLI boundary.
//!
//! # Error Categories
//!
//! - **Identifier errors**: malformed profile or provider names, rejected before any I/O
//! - **Lookup errors**: missing local files, manifest entries, or store entries
//! - **Conflicts**: a re-install pointing somewhere else without `--force`
//! - **Check preconditions**: profile/provider pairs the manifest does not declare
//! - **Store errors**: the remote collaborator could not be reached
//! - **Manifest errors**: the on-disk manifest could not be parsed
//!
//! Every variant maps to a process exit code through [`SuperfaceError::exit_code`].

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Exit code for unexpected failures.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for invalid input, missing entries, or malformed documents.
pub const EXIT_VALIDATION: i32 = 2;
/// Exit code for divergent re-installs.
pub const EXIT_CONFLICT: i32 = 3;
/// Exit code for a check that found error-severity issues.
pub const EXIT_CHECK_ERRORS: i32 = 4;
/// Exit code for a check that found warnings only.
pub const EXIT_CHECK_WARNINGS: i32 = 5;

/// The main error type for Superface CLI operations.
#[derive(Error, Debug)]
pub enum SuperfaceError {
    /// A profile identifier, provider name, or version failed validation.
    #[error("Invalid {kind} \"{value}\": {reason}")]
    InvalidIdentifier {
        /// What was being validated ("profile id", "provider name", "version")
        kind: String,
        /// The rejected input
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// A requested manifest scan depth exceeds the supported maximum.
    #[error("Scan level {requested} is out of range, at most {max} parent directories can be scanned")]
    InvalidScanLevel {
        /// Requested number of parent levels
        requested: usize,
        /// Supported maximum
        max: usize,
    },

    /// A local path or a store entry does not exist.
    #[error("{what} not found: {location}")]
    NotFound {
        /// Kind of the missing thing ("profile source", "provider definition", ...)
        what: String,
        /// Path or store address
        location: String,
    },

    /// An entry is already installed from another source and `force` was not set.
    #[error("{kind} \"{name}\" already installed from a different path (installed: {existing}, requested: {requested})")]
    AlreadyInstalledConflict {
        /// "Profile", "Provider" or "Provider binding"
        kind: String,
        /// Key of the entry in the manifest
        name: String,
        /// Source currently recorded in the manifest
        existing: String,
        /// Source the request resolved to
        requested: String,
    },

    /// A profile requested for checking is absent from the manifest.
    #[error("Profile \"{profile}\" not found in super.json")]
    NotFoundInManifest {
        /// Requested profile id
        profile: String,
    },

    /// A requested provider is not bound under the profile.
    #[error("Provider \"{provider}\" not found for profile \"{profile}\" in super.json")]
    ProviderNotFoundInProfile {
        /// Profile id
        profile: String,
        /// Requested provider
        provider: String,
    },

    /// A provider has no top-level entry in the manifest.
    #[error("Provider \"{provider}\" not found in super.json")]
    ProviderNotFoundInManifest {
        /// Provider name
        provider: String,
    },

    /// The remote store could not serve a request.
    #[error("Store unavailable while {operation}: {reason}")]
    StoreUnavailable {
        /// Operation in flight ("fetching latest version of x", ...)
        operation: String,
        /// Underlying failure
        reason: String,
    },

    /// The on-disk manifest is malformed.
    #[error("Unable to load manifest {file}: {reason}")]
    ManifestLoadError {
        /// Manifest path
        file: String,
        /// Parse or shape error
        reason: String,
    },

    /// A source document could not be parsed by the document collaborator.
    #[error("Syntax error in {origin}: {reason}")]
    SyntaxError {
        /// Origin label (path or store address)
        origin: String,
        /// Parser message
        reason: String,
    },

    /// IO error from file system operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error for cases not covered by specific variants
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl SuperfaceError {
    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidIdentifier {
                ..
            }
            | Self::InvalidScanLevel {
                ..
            }
            | Self::NotFound {
                ..
            }
            | Self::NotFoundInManifest {
                ..
            }
            | Self::ProviderNotFoundInProfile {
                ..
            }
            | Self::ProviderNotFoundInManifest {
                ..
            }
            | Self::ManifestLoadError {
                ..
            }
            | Self::SyntaxError {
                ..
            } => EXIT_VALIDATION,
            Self::AlreadyInstalledConflict {
                ..
            } => EXIT_CONFLICT,
            Self::StoreUnavailable {
                ..
            }
            | Self::IoError(_)
            | Self::JsonError(_)
            | Self::Other {
                ..
            } => EXIT_FAILURE,
        }
    }

    /// Shorthand for [`SuperfaceError::NotFound`].
    pub fn not_found(what: impl Into<String>, location: impl Into<String>) -> Self {
        Self::NotFound {
            what: what.into(),
            location: location.into(),
        }
    }

    /// Shorthand for [`SuperfaceError::InvalidIdentifier`].
    pub fn invalid_identifier(
        kind: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidIdentifier {
            kind: kind.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

impl Clone for SuperfaceError {
    fn clone(&self) -> Self {
        match self {
            Self::InvalidIdentifier {
                kind,
                value,
                reason,
            } => Self::InvalidIdentifier {
                kind: kind.clone(),
                value: value.clone(),
                reason: reason.clone(),
            },
            Self::InvalidScanLevel {
                requested,
                max,
            } => Self::InvalidScanLevel {
                requested: *requested,
                max: *max,
            },
            Self::NotFound {
                what,
                location,
            } => Self::NotFound {
                what: what.clone(),
                location: location.clone(),
            },
            Self::AlreadyInstalledConflict {
                kind,
                name,
                existing,
                requested,
            } => Self::AlreadyInstalledConflict {
                kind: kind.clone(),
                name: name.clone(),
                existing: existing.clone(),
                requested: requested.clone(),
            },
            Self::NotFoundInManifest {
                profile,
            } => Self::NotFoundInManifest {
                profile: profile.clone(),
            },
            Self::ProviderNotFoundInProfile {
                profile,
                provider,
            } => Self::ProviderNotFoundInProfile {
                profile: profile.clone(),
                provider: provider.clone(),
            },
            Self::ProviderNotFoundInManifest {
                provider,
            } => Self::ProviderNotFoundInManifest {
                provider: provider.clone(),
            },
            Self::StoreUnavailable {
                operation,
                reason,
            } => Self::StoreUnavailable {
                operation: operation.clone(),
                reason: reason.clone(),
            },
            Self::ManifestLoadError {
                file,
                reason,
            } => Self::ManifestLoadError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::SyntaxError {
                origin,
                reason,
            } => Self::SyntaxError {
                origin: origin.clone(),
                reason: reason.clone(),
            },
            // For errors that don't implement Clone, convert to Other
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::JsonError(e) => Self::Other {
                message: format!("JSON error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// `ErrorContext` wraps a [`SuperfaceError`] and adds optional suggestions for
/// resolution and additional details. This is how fatal errors are presented
/// to CLI users.
///
/// # Display Format
///
/// 1. **Error**: The main error message in red
/// 2. **Details**: Additional context about the error in yellow (optional)
/// 3. **Suggestion**: Actionable steps to resolve the issue in green (optional)
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: SuperfaceError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: SuperfaceError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Exit code of the wrapped error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.error.exit_code()
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`SuperfaceError`] anywhere in the `anyhow` chain, then
/// [`std::io::Error`] and [`serde_json::Error`]; everything else is rendered
/// as [`SuperfaceError::Other`] with the full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(sf_error) = error.chain().find_map(|cause| cause.downcast_ref::<SuperfaceError>()) {
        return create_error_context(sf_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::PermissionDenied {
            return ErrorContext::new(SuperfaceError::Other {
                message: error_chain_message(&error),
            })
            .with_suggestion("Check file ownership and permissions of the superface directory");
        }
    }

    ErrorContext::new(SuperfaceError::Other {
        message: error_chain_message(&error),
    })
}

fn error_chain_message(error: &anyhow::Error) -> String {
    let mut message = error.to_string();

    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    message
}

/// Map each [`SuperfaceError`] variant to an [`ErrorContext`] with tailored suggestions.
fn create_error_context(error: SuperfaceError) -> ErrorContext {
    match &error {
        SuperfaceError::InvalidIdentifier {
            kind,
            ..
        } => {
            let suggestion = if kind.contains("version") {
                "Versions must be exact semantic versions, e.g. 1.0.2"
            } else {
                "Identifiers use lowercase segments, e.g. starwars/character-information or swapi"
            };
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        SuperfaceError::InvalidScanLevel {
            max,
            ..
        } => {
            let max = *max;
            ErrorContext::new(error)
                .with_suggestion(format!("Pass a --scan value between 0 and {max}"))
        }

        SuperfaceError::AlreadyInstalledConflict {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Re-run with --force to replace the installed entry")
            .with_details("Re-installing the same source is a no-op; only a different file or version conflicts"),

        SuperfaceError::NotFoundInManifest {
            profile,
        } => {
            let suggestion = format!("Install it first with 'superface install {profile}'");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        SuperfaceError::ProviderNotFoundInProfile {
            profile,
            provider,
        } => {
            let suggestion =
                format!("Bind it with 'superface install {profile} --providers {provider}'");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        SuperfaceError::ProviderNotFoundInManifest {
            provider,
        } => {
            let suggestion = format!("Add a top-level \"{provider}\" entry under \"providers\"");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        SuperfaceError::StoreUnavailable {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check your network connection or the SUPERFACE_API_URL setting")
            .with_details("Store requests are retried with backoff before giving up"),

        SuperfaceError::ManifestLoadError {
            file,
            ..
        } => {
            let suggestion = format!(
                "Fix {file}. Profiles need exactly one of \"file\" or \"version\", \
                 and file paths are relative to the superface directory"
            );
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        _ => ErrorContext::new(error),
    }
}
