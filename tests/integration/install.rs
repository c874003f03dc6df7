use crate::{PROFILE_ID, superface};
use predicates::prelude::*;
use serde_json::json;
use superface_cli::core::ProfileId;
use superface_cli::manifest::{BindingSource, ProfileSource, ProviderSource};
use superface_cli::test_utils::{TestProject, fixtures};

fn id() -> ProfileId {
    ProfileId::parse(PROFILE_ID).unwrap()
}

fn project_with_profile() -> TestProject {
    let project = TestProject::new().unwrap();
    project
        .write_file("profiles/character.supr", &fixtures::profile_source(PROFILE_ID, "1.0.2", &["Get"]))
        .unwrap();
    project
}

#[test]
fn test_local_install_creates_manifest() {
    let project = project_with_profile();

    superface(&project)
        .args(["install", "--local", "profiles/character.supr"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Installed {PROFILE_ID}")));

    let document = project.load_manifest().unwrap();
    assert_eq!(
        document.profile(&id()).unwrap().source,
        ProfileSource::Local {
            file: "../profiles/character.supr".to_string()
        }
    );
}

#[test]
fn test_local_install_with_local_provider() {
    let project = project_with_profile();
    project.write_file("providers/mock.json", &fixtures::provider_json("mock")).unwrap();

    superface(&project)
        .args(["install", "--local", "profiles/character.supr", "--providers", "providers/mock.json"])
        .assert()
        .success();

    let document = project.load_manifest().unwrap();
    assert_eq!(
        document.provider("mock").unwrap().source,
        ProviderSource::Local {
            file: "../providers/mock.json".to_string()
        }
    );
    let entry = document.profile(&id()).unwrap();
    assert_eq!(entry.providers["mock"].source, BindingSource::store_default());
    assert_eq!(entry.priority, vec!["mock".to_string()]);
}

#[test]
fn test_conflicting_local_source_exits_with_conflict() {
    let project = project_with_profile();
    project
        .write_file("profiles/other.supr", &fixtures::profile_source(PROFILE_ID, "1.0.3", &["Get"]))
        .unwrap();

    superface(&project).args(["install", "--local", "profiles/character.supr"]).assert().success();
    let before = project.read_manifest().unwrap();

    superface(&project)
        .args(["install", "--local", "profiles/other.supr"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("already installed from a different path"));

    assert_eq!(project.read_manifest().unwrap(), before);
}

#[test]
fn test_force_replaces_local_source() {
    let project = project_with_profile();
    project
        .write_file("profiles/other.supr", &fixtures::profile_source(PROFILE_ID, "1.0.3", &["Get"]))
        .unwrap();

    superface(&project).args(["install", "--local", "profiles/character.supr"]).assert().success();
    superface(&project)
        .args(["install", "--local", "profiles/other.supr", "--force"])
        .assert()
        .success();

    assert_eq!(
        project.load_manifest().unwrap().profile(&id()).unwrap().source,
        ProfileSource::Local {
            file: "../profiles/other.supr".to_string()
        }
    );
}

#[test]
fn test_reinstall_from_manifest_is_noop() {
    let project = project_with_profile();
    superface(&project).args(["install", "--local", "profiles/character.supr"]).assert().success();
    let before = project.read_manifest().unwrap();

    superface(&project)
        .arg("install")
        .assert()
        .success()
        .stdout(predicate::str::contains("is already installed"));

    assert_eq!(project.read_manifest().unwrap(), before);
}

#[test]
fn test_reinstall_hand_written_paths_is_noop() {
    let project = project_with_profile();
    let manifest = json!({ "profiles": { PROFILE_ID: { "file": "./..\\profiles/character.supr" } } });
    project.write_manifest(&manifest.to_string()).unwrap();

    superface(&project)
        .arg("install")
        .assert()
        .success()
        .stdout(predicate::str::contains("is already installed"));

    assert_eq!(
        project.load_manifest().unwrap().profile(&id()).unwrap().source,
        ProfileSource::Local {
            file: "../profiles/character.supr".to_string()
        }
    );
}

#[test]
fn test_absolute_manifest_path_is_rejected() {
    let project = project_with_profile();
    let manifest = json!({ "profiles": { PROFILE_ID: { "file": "/tmp/character.supr" } } });
    project.write_manifest(&manifest.to_string()).unwrap();

    superface(&project)
        .arg("install")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("must be relative to the manifest directory"));
}

#[test]
fn test_providers_without_profiles_is_rejected() {
    let project = TestProject::new().unwrap();

    superface(&project)
        .args(["install", "--providers", "swapi"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Profiles to bind providers to not found"));

    assert!(!project.manifest_path().exists());
}

#[test]
fn test_empty_project_has_nothing_to_install() {
    let project = TestProject::new().unwrap();

    superface(&project)
        .arg("install")
        .assert()
        .success()
        .stdout(predicate::str::contains("No profiles to install"));

    assert!(!project.manifest_path().exists());
}

#[test]
fn test_scan_level_out_of_range() {
    let project = project_with_profile();

    superface(&project)
        .args(["install", "--local", "profiles/character.supr", "--scan", "6"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Scan level 6 is out of range"));

    assert!(!project.manifest_path().exists());
}

#[test]
fn test_invalid_profile_identifier() {
    let project = TestProject::new().unwrap();

    superface(&project)
        .args(["install", "Star Wars"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid"));
}

#[test]
fn test_missing_local_profile_fails_item() {
    let project = TestProject::new().unwrap();

    superface(&project)
        .args(["install", "--local", "profiles/missing.supr"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("not found"));

    assert!(!project.manifest_path().exists());
}

#[test]
fn test_scan_finds_manifest_in_parent() {
    let project = project_with_profile();
    superface(&project).args(["install", "--local", "profiles/character.supr"]).assert().success();
    project.write_file("src/nested/.keep", "").unwrap();

    superface(&project)
        .current_dir(project.path().join("src"))
        .args(["install", "--scan", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is already installed"));

    assert!(!project.path().join("src/superface").exists());
}
