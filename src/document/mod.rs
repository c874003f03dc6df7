//! Source document collaborator: header parsing and compatibility checks.
//!
//! Full grammar parsing is out of scope for the CLI. The [`DocumentValidator`]
//! trait is the seam where a real parser plugs in; [`HeaderValidator`] is the
//! built-in implementation and reads only what the install and check engines
//! need from each document:
//!
//! - **Profile** (`.supr`): `name = "scope/name"`, `version = "1.0.2"` and the
//!   names of `usecase X` blocks.
//! - **Map** (`.suma`): `profile = "scope/name@1.0"`, `provider = "swapi"`,
//!   optional `variant = "..."` and the names of `map X` blocks.
//! - **Provider** (`.json`): the `name` and `services` keys of the definition.
//!
//! Header assignments are only recognized before the first block opener, and
//! `//` line comments and `"""` doc strings are skipped.

use crate::core::{ProfileId, SuperfaceError, validate_provider_name};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Parsed header of a profile source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDocument {
    /// Declared profile identifier
    pub id: ProfileId,
    /// Declared profile version
    pub version: semver::Version,
    /// Usecase names in declaration order
    pub usecases: Vec<String>,
}

/// Profile version a map targets: major and minor are required, patch is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetVersion {
    /// Major component
    pub major: u64,
    /// Minor component
    pub minor: u64,
    /// Patch component, when given
    pub patch: Option<u64>,
}

impl TargetVersion {
    fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = match parts.next() {
            Some(patch) => Some(patch.parse().ok()?),
            None => None,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            major,
            minor,
            patch,
        })
    }
}

impl fmt::Display for TargetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(patch) = self.patch {
            write!(f, ".{patch}")?;
        }
        Ok(())
    }
}

/// Parsed header of a map source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapDocument {
    /// Profile the map implements
    pub profile: ProfileId,
    /// Profile version the map implements
    pub profile_version: TargetVersion,
    /// Provider the map targets
    pub provider: String,
    /// Map variant, if any
    pub variant: Option<String>,
    /// Names of the `map` blocks in declaration order
    pub maps: Vec<String>,
}

/// A provider definition document.
///
/// Only `name` and `services` are interpreted; everything else is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderDefinition {
    /// Provider name
    pub name: String,
    /// Declared services
    #[serde(default)]
    pub services: Vec<Value>,
    /// Uninterpreted keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProviderDefinition {
    /// Parse a provider definition, unwrapping a `{"definition": {...}}` envelope.
    pub fn from_json(content: &str, origin: &str) -> Result<Self, SuperfaceError> {
        let syntax = |reason: String| SuperfaceError::SyntaxError {
            origin: origin.to_string(),
            reason,
        };

        let mut value: Value = serde_json::from_str(content).map_err(|e| syntax(e.to_string()))?;
        if let Some(inner) = value.get_mut("definition") {
            value = inner.take();
        }
        serde_json::from_value(value).map_err(|e| syntax(e.to_string()))
    }
}

/// Findings of one compatibility check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Error-severity findings
    pub errors: Vec<String>,
    /// Warning-severity findings
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Whether the check found no errors.
    #[must_use]
    pub fn pass(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parser and compatibility checker for source documents.
pub trait DocumentValidator: Send + Sync {
    /// Parse a profile source. `origin` labels errors.
    fn parse_profile(&self, source: &str, origin: &str) -> Result<ProfileDocument, SuperfaceError>;

    /// Parse a map source. `origin` labels errors.
    fn parse_map(&self, source: &str, origin: &str) -> Result<MapDocument, SuperfaceError>;

    /// Compare a profile with a map implementing it.
    fn validate_profile_map(
        &self,
        profile: &ProfileDocument,
        map: &MapDocument,
    ) -> ValidationReport;

    /// Compare a map with the definition of the provider it targets.
    fn validate_map_provider(
        &self,
        map: &MapDocument,
        provider: &ProviderDefinition,
    ) -> ValidationReport;
}

/// Header-level [`DocumentValidator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderValidator;

impl HeaderValidator {
    /// Create the validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn assignment_regex() -> &'static Regex {
    static ASSIGNMENT: OnceLock<Regex> = OnceLock::new();
    ASSIGNMENT.get_or_init(|| {
        Regex::new(r#"^([a-z]+)\s*=\s*"([^"]*)"$"#).expect("assignment regex is valid")
    })
}

fn block_regex() -> &'static Regex {
    static BLOCK: OnceLock<Regex> = OnceLock::new();
    BLOCK.get_or_init(|| {
        Regex::new(r"^([a-z]+)\s+([A-Za-z_][A-Za-z0-9_]*)").expect("block regex is valid")
    })
}

/// Drop a `//` comment, leaving `//` inside string literals alone.
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut previous = None;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '/' if !in_string && previous == Some('/') => return &line[..i - 1],
            _ => {}
        }
        previous = Some(c);
    }
    line
}

/// Header assignments and block openers of a document.
#[derive(Debug, Default)]
struct Outline {
    header: BTreeMap<String, String>,
    blocks: Vec<(String, String)>,
}

fn outline(source: &str) -> Outline {
    let mut outline = Outline::default();
    let mut in_doc_string = false;
    let mut depth = 0usize;

    for raw in source.lines() {
        let line = strip_comment(raw).trim();
        if line.starts_with("\"\"\"") {
            // A doc string opening and closing on the same line leaves the state untouched
            if !(line.len() > 3 && line.ends_with("\"\"\"")) {
                in_doc_string = !in_doc_string;
            }
            continue;
        }
        if in_doc_string || line.is_empty() {
            continue;
        }

        if depth == 0 {
            if outline.blocks.is_empty() {
                if let Some(caps) = assignment_regex().captures(line) {
                    outline.header.entry(caps[1].to_string()).or_insert_with(|| caps[2].to_string());
                    continue;
                }
            }
            if let Some(caps) = block_regex().captures(line) {
                outline.blocks.push((caps[1].to_string(), caps[2].to_string()));
            }
        }

        for c in line.chars() {
            match c {
                '{' => depth += 1,
                '}' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
    }

    outline
}

impl Outline {
    fn require(&self, key: &str, origin: &str) -> Result<&str, SuperfaceError> {
        self.header.get(key).map(String::as_str).ok_or_else(|| SuperfaceError::SyntaxError {
            origin: origin.to_string(),
            reason: format!("missing header field \"{key}\""),
        })
    }

    fn blocks_of(&self, keyword: &str) -> Vec<String> {
        self.blocks.iter().filter(|(kind, _)| kind == keyword).map(|(_, name)| name.clone()).collect()
    }
}

impl DocumentValidator for HeaderValidator {
    fn parse_profile(&self, source: &str, origin: &str) -> Result<ProfileDocument, SuperfaceError> {
        let syntax = |reason: String| SuperfaceError::SyntaxError {
            origin: origin.to_string(),
            reason,
        };
        let outline = outline(source);

        let id = ProfileId::parse(outline.require("name", origin)?).map_err(|e| syntax(e.to_string()))?;
        let version = semver::Version::parse(outline.require("version", origin)?)
            .map_err(|e| syntax(format!("invalid profile version: {e}")))?;

        Ok(ProfileDocument {
            id,
            version,
            usecases: outline.blocks_of("usecase"),
        })
    }

    fn parse_map(&self, source: &str, origin: &str) -> Result<MapDocument, SuperfaceError> {
        let syntax = |reason: String| SuperfaceError::SyntaxError {
            origin: origin.to_string(),
            reason,
        };
        let outline = outline(source);

        let target = outline.require("profile", origin)?;
        let (id, version) = target
            .split_once('@')
            .ok_or_else(|| syntax(format!("profile \"{target}\" must be <profileId>@<major>.<minor>")))?;
        let profile = ProfileId::parse(id).map_err(|e| syntax(e.to_string()))?;
        let profile_version = TargetVersion::parse(version)
            .ok_or_else(|| syntax(format!("invalid profile version \"{version}\"")))?;

        let provider = outline.require("provider", origin)?.to_string();
        validate_provider_name(&provider).map_err(|e| syntax(e.to_string()))?;

        Ok(MapDocument {
            profile,
            profile_version,
            provider,
            variant: outline.header.get("variant").cloned(),
            maps: outline.blocks_of("map"),
        })
    }

    fn validate_profile_map(
        &self,
        profile: &ProfileDocument,
        map: &MapDocument,
    ) -> ValidationReport {
        let mut report = ValidationReport::default();

        if map.profile != profile.id {
            report.errors.push(format!(
                "Map targets profile \"{}\" but the profile is \"{}\"",
                map.profile, profile.id
            ));
        }

        let target = map.profile_version;
        if target.major != profile.version.major || target.minor != profile.version.minor {
            report.errors.push(format!(
                "Map targets profile version {target} which does not match profile version {}",
                profile.version
            ));
        }

        for usecase in &profile.usecases {
            if !map.maps.contains(usecase) {
                report.errors.push(format!("Usecase \"{usecase}\" is not mapped"));
            }
        }
        for name in &map.maps {
            if !profile.usecases.contains(name) {
                report.warnings.push(format!("Map \"{name}\" has no matching usecase in the profile"));
            }
        }

        report
    }

    fn validate_map_provider(
        &self,
        map: &MapDocument,
        provider: &ProviderDefinition,
    ) -> ValidationReport {
        let mut report = ValidationReport::default();

        if provider.name != map.provider {
            report.errors.push(format!(
                "Map targets provider \"{}\" but the provider definition is named \"{}\"",
                map.provider, provider.name
            ));
        }
        if provider.services.is_empty() {
            report.warnings.push(format!("Provider \"{}\" declares no services", provider.name));
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = r#""""
Character information
"""

name = "starwars/character-information"
version = "1.0.2"

// Retrieve a character
usecase RetrieveCharacterInformation safe {
  input {
    characterName
  }
}

usecase ListCharacters safe {}
"#;

    const MAP: &str = r#"profile = "starwars/character-information@1.0"
provider = "swapi"

map RetrieveCharacterInformation {
  http GET "https://swapi.dev/api/people" {
    response 200 {
      map result {}
    }
  }
}

map ListCharacters {}
"#;

    fn provider(name: &str, services: bool) -> ProviderDefinition {
        let services = if services {
            r#"[{"id": "default", "baseUrl": "https://swapi.dev/api"}]"#
        } else {
            "[]"
        };
        ProviderDefinition::from_json(&format!(r#"{{"name": "{name}", "services": {services}}}"#), "p.json")
            .unwrap()
    }

    #[test]
    fn test_parse_profile_header() {
        let doc = HeaderValidator::new().parse_profile(PROFILE, "profile.supr").unwrap();
        assert_eq!(doc.id.to_string(), "starwars/character-information");
        assert_eq!(doc.version, semver::Version::new(1, 0, 2));
        assert_eq!(doc.usecases, vec!["RetrieveCharacterInformation", "ListCharacters"]);
    }

    #[test]
    fn test_parse_map_header_ignores_nested_blocks() {
        let doc = HeaderValidator::new().parse_map(MAP, "map.suma").unwrap();
        assert_eq!(doc.profile.to_string(), "starwars/character-information");
        assert_eq!(
            doc.profile_version,
            TargetVersion {
                major: 1,
                minor: 0,
                patch: None
            }
        );
        assert_eq!(doc.provider, "swapi");
        assert_eq!(doc.variant, None);
        // "map result" inside the http block is not a top-level map
        assert_eq!(doc.maps, vec!["RetrieveCharacterInformation", "ListCharacters"]);
    }

    #[test]
    fn test_strip_comment_keeps_urls() {
        assert_eq!(strip_comment("name = \"a/b\" // trailing"), "name = \"a/b\" ");
        assert_eq!(strip_comment("http GET \"https://x.dev\" {"), "http GET \"https://x.dev\" {");
        assert_eq!(strip_comment("// whole line"), "");
    }

    #[test]
    fn test_missing_header_is_syntax_error() {
        let err = HeaderValidator::new()
            .parse_profile("usecase Foo {}\nname = \"a/b\"\n", "broken.supr")
            .unwrap_err();
        match err {
            SuperfaceError::SyntaxError {
                origin,
                reason,
            } => {
                assert_eq!(origin, "broken.supr");
                assert!(reason.contains("name"));
            }
            other => panic!("Expected SyntaxError, got {other:?}"),
        }
    }

    #[test]
    fn test_map_profile_requires_version() {
        let source = "profile = \"a/b\"\nprovider = \"p\"\n";
        assert!(HeaderValidator::new().parse_map(source, "m.suma").is_err());
    }

    #[test]
    fn test_profile_map_compatible() {
        let validator = HeaderValidator::new();
        let profile = validator.parse_profile(PROFILE, "p").unwrap();
        let map = validator.parse_map(MAP, "m").unwrap();

        let report = validator.validate_profile_map(&profile, &map);
        assert!(report.pass());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_profile_map_mismatches() {
        let validator = HeaderValidator::new();
        let profile = validator.parse_profile(PROFILE, "p").unwrap();
        let map = validator
            .parse_map(
                "profile = \"starwars/other@2.0\"\nprovider = \"swapi\"\nmap RetrieveCharacterInformation {}\nmap Extra {}\n",
                "m",
            )
            .unwrap();

        let report = validator.validate_profile_map(&profile, &map);
        assert!(!report.pass());
        assert_eq!(report.errors.len(), 3);
        assert!(report.errors.iter().any(|e| e.contains("starwars/other")));
        assert!(report.errors.iter().any(|e| e.contains("2.0")));
        assert!(report.errors.iter().any(|e| e.contains("ListCharacters")));
        assert_eq!(report.warnings, vec!["Map \"Extra\" has no matching usecase in the profile"]);
    }

    #[test]
    fn test_map_provider_checks() {
        let validator = HeaderValidator::new();
        let map = validator.parse_map(MAP, "m").unwrap();

        assert_eq!(validator.validate_map_provider(&map, &provider("swapi", true)), ValidationReport::default());

        let report = validator.validate_map_provider(&map, &provider("other", false));
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_provider_definition_envelope() {
        let def = ProviderDefinition::from_json(
            r#"{"definition": {"name": "swapi", "services": [], "defaultService": "default"}}"#,
            "store",
        )
        .unwrap();
        assert_eq!(def.name, "swapi");
        assert!(def.extra.contains_key("defaultService"));

        assert!(matches!(
            ProviderDefinition::from_json(r#"{"services": []}"#, "p.json"),
            Err(SuperfaceError::SyntaxError { .. })
        ));
    }
}
