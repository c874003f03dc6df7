//! Profile and provider identifiers.
//!
//! Identifiers are validated before any filesystem or network work happens, so
//! a malformed name never reaches the store.

use super::error::SuperfaceError;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn segment_regex() -> &'static Regex {
    static SEGMENT: OnceLock<Regex> = OnceLock::new();
    SEGMENT.get_or_init(|| Regex::new(r"^[a-z][a-z0-9_-]*$").expect("segment regex is valid"))
}

/// Check a single lowercase identifier segment.
#[must_use]
pub fn is_valid_segment(segment: &str) -> bool {
    segment_regex().is_match(segment)
}

/// Validate a provider name.
pub fn validate_provider_name(name: &str) -> Result<(), SuperfaceError> {
    if is_valid_segment(name) {
        Ok(())
    } else {
        Err(SuperfaceError::invalid_identifier(
            "provider name",
            name,
            "expected a lowercase name starting with a letter",
        ))
    }
}

/// A profile identifier: an optional scope and a name, `scope/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProfileId {
    scope: Option<String>,
    name: String,
}

impl ProfileId {
    /// Parse and validate a profile identifier.
    pub fn parse(input: &str) -> Result<Self, SuperfaceError> {
        let invalid = |reason: &str| SuperfaceError::invalid_identifier("profile id", input, reason);

        let (scope, name) = match input.split_once('/') {
            Some((scope, name)) => (Some(scope), name),
            None => (None, input),
        };

        if name.contains('/') {
            return Err(invalid("at most one scope segment is allowed"));
        }
        if let Some(scope) = scope {
            if !is_valid_segment(scope) {
                return Err(invalid("scope must be a lowercase segment starting with a letter"));
            }
        }
        if !is_valid_segment(name) {
            return Err(invalid("name must be a lowercase segment starting with a letter"));
        }

        Ok(Self {
            scope: scope.map(str::to_string),
            name: name.to_string(),
        })
    }

    /// Scope segment, if any.
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Name segment.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{scope}/{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl FromStr for ProfileId {
    type Err = SuperfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ProfileId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProfileId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Validate an exact semantic version and return it in canonical form.
pub fn validate_version(version: &str) -> Result<String, SuperfaceError> {
    semver::Version::parse(version).map(|v| v.to_string()).map_err(|e| {
        SuperfaceError::invalid_identifier("version", version, e.to_string())
    })
}

/// A CLI profile reference: `<profileId>[@<version>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRef {
    /// The profile identifier
    pub id: ProfileId,
    /// Exact version, when pinned
    pub version: Option<String>,
}

impl FromStr for ProfileRef {
    type Err = SuperfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('@') {
            Some((id, version)) => Ok(Self {
                id: ProfileId::parse(id)?,
                version: Some(validate_version(version)?),
            }),
            None => Ok(Self {
                id: ProfileId::parse(s)?,
                version: None,
            }),
        }
    }
}

impl fmt::Display for ProfileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{version}", self.id),
            None => write!(f, "{}", self.id),
        }
    }
}
