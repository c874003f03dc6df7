//! Source texts for profiles, maps and provider definitions.

use std::fmt::Write as _;

/// A profile source declaring `id`, `version` and one usecase per name.
#[must_use]
pub fn profile_source(id: &str, version: &str, usecases: &[&str]) -> String {
    let mut source = format!("\"\"\"\nTest profile\n\"\"\"\n\nname = \"{id}\"\nversion = \"{version}\"\n");
    for usecase in usecases {
        let _ = write!(source, "\nusecase {usecase} safe {{\n  input {{\n    id\n  }}\n}}\n");
    }
    source
}

/// A map source for `profile` at `target_version` (`major.minor[.patch]`).
#[must_use]
pub fn map_source(profile: &str, target_version: &str, provider: &str, maps: &[&str]) -> String {
    let mut source = format!("profile = \"{profile}@{target_version}\"\nprovider = \"{provider}\"\n");
    for map in maps {
        let _ = write!(
            source,
            "\nmap {map} {{\n  http GET \"https://example.com/api\" {{\n    response 200 {{\n      map result {{}}\n    }}\n  }}\n}}\n"
        );
    }
    source
}

/// A provider definition with one default service.
#[must_use]
pub fn provider_json(name: &str) -> String {
    format!(
        r#"{{
  "name": "{name}",
  "services": [{{ "id": "default", "baseUrl": "https://{name}.example.com" }}],
  "defaultService": "default"
}}"#
    )
}

/// A provider definition declaring no services.
#[must_use]
pub fn provider_json_without_services(name: &str) -> String {
    format!(r#"{{ "name": "{name}", "services": [] }}"#)
}
