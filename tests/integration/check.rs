use crate::{PROFILE_ID, superface};
use predicates::prelude::*;
use serde_json::{Value, json};
use superface_cli::test_utils::{TestProject, fixtures};

/// Project with a local profile, a local `swapi` map and a local provider definition.
fn local_project(map_usecases: &[&str], provider_json: &str) -> TestProject {
    let project = TestProject::new().unwrap();
    project
        .write_file("profiles/character.supr", &fixtures::profile_source(PROFILE_ID, "1.0.2", &["Get"]))
        .unwrap();
    project
        .write_file(
            "maps/character.swapi.suma",
            &fixtures::map_source(PROFILE_ID, "1.0", "swapi", map_usecases),
        )
        .unwrap();
    project.write_file("providers/swapi.json", provider_json).unwrap();
    project
        .write_manifest(
            &json!({
                "profiles": {
                    PROFILE_ID: {
                        "file": "../profiles/character.supr",
                        "providers": { "swapi": { "file": "../maps/character.swapi.suma" } }
                    }
                },
                "providers": { "swapi": { "file": "../providers/swapi.json" } }
            })
            .to_string(),
        )
        .unwrap();
    project
}

#[test]
fn test_compatible_sources() {
    let project = local_project(&["Get"], &fixtures::provider_json("swapi"));

    superface(&project)
        .args(["check", "--profileId", PROFILE_ID, "--providerName", "swapi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No issues found"));
}

#[test]
fn test_check_all_pairs_without_arguments() {
    let project = local_project(&["Get"], &fixtures::provider_json("swapi"));

    superface(&project)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("local file ../maps/character.swapi.suma"));
}

#[test]
fn test_unmapped_usecase_is_an_error() {
    let project = local_project(&["Other"], &fixtures::provider_json("swapi"));

    superface(&project)
        .args(["check", "--profileId", PROFILE_ID])
        .assert()
        .code(4)
        .stdout(predicate::str::contains("Usecase \"Get\" is not mapped"))
        .stdout(predicate::str::contains("1 error(s) and 1 warning(s)"));
}

#[test]
fn test_warnings_only_and_quiet() {
    let project = local_project(&["Get"], &fixtures::provider_json_without_services("swapi"));

    superface(&project)
        .args(["check", "--profileId", PROFILE_ID])
        .assert()
        .code(5)
        .stdout(predicate::str::contains("declares no services"));

    superface(&project)
        .args(["check", "--profileId", PROFILE_ID, "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("declares no services").not());
}

#[test]
fn test_json_output() {
    let project = local_project(&["Get"], &fixtures::provider_json("swapi"));

    let output = superface(&project)
        .args(["check", "--profileId", PROFILE_ID, "--providerName", "swapi", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let results: Value = serde_json::from_slice(&output.stdout).unwrap();
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["kind"], "profileMap");
    assert_eq!(results[0]["profileSource"]["path"], "../profiles/character.supr");
    assert_eq!(results[1]["kind"], "mapProvider");
    assert_eq!(results[1]["issues"], json!([]));
}

#[test]
fn test_missing_map_file_is_reported() {
    let project = local_project(&["Get"], &fixtures::provider_json("swapi"));
    std::fs::remove_file(project.path().join("maps/character.swapi.suma")).unwrap();

    superface(&project)
        .args(["check", "--profileId", PROFILE_ID])
        .assert()
        .code(4)
        .stdout(predicate::str::contains("Unable to load map"));
}

#[test]
fn test_provider_not_bound_to_profile() {
    let project = local_project(&["Get"], &fixtures::provider_json("swapi"));

    superface(&project)
        .args(["check", "--profileId", PROFILE_ID, "--providerName", "mailchimp"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Provider \"mailchimp\" not found for profile"));
}

#[test]
fn test_profile_not_in_manifest() {
    let project = local_project(&["Get"], &fixtures::provider_json("swapi"));

    superface(&project)
        .args(["check", "--profileId", "other/profile"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Profile \"other/profile\" not found in super.json"));
}

#[test]
fn test_missing_manifest() {
    let project = TestProject::new().unwrap();

    superface(&project).arg("check").assert().code(2).stderr(predicate::str::contains("super.json not found"));
}

#[test]
fn test_check_never_writes_manifest() {
    let project = local_project(&["Other"], &fixtures::provider_json("swapi"));
    let before = project.read_manifest().unwrap();

    superface(&project).arg("check").assert().code(4);

    assert_eq!(project.read_manifest().unwrap(), before);
}
