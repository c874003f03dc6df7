use super::*;
use crate::document::HeaderValidator;
use crate::test_utils::{MockStore, TestProject, fixtures};

const PROFILE_ID: &str = "starwars/character-information";

fn id() -> ProfileId {
    ProfileId::parse(PROFILE_ID).unwrap()
}

fn resolver(project: &TestProject, store: MockStore) -> (SourceResolver, Arc<MockStore>) {
    let store = Arc::new(store);
    let resolver =
        SourceResolver::new(store.clone(), Arc::new(HeaderValidator::new()), project.manifest_dir());
    (resolver, store)
}

#[tokio::test]
async fn test_local_profile_records_relative_path() {
    let project = TestProject::new().unwrap();
    let path = project
        .write_file("profiles/character.supr", &fixtures::profile_source(PROFILE_ID, "1.0.2", &["Get"]))
        .unwrap();
    let (resolver, store) = resolver(&project, MockStore::new());

    let resolved = resolver.resolve_profile(&InstallRequest::local(&path)).await.unwrap();

    assert_eq!(resolved.id, id());
    assert_eq!(
        resolved.source,
        ProfileSource::Local {
            file: "../profiles/character.supr".to_string()
        }
    );
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_local_profile_missing_is_not_found() {
    let project = TestProject::new().unwrap();
    let (resolver, _) = resolver(&project, MockStore::new());

    let err = resolver
        .resolve_profile(&InstallRequest::local(project.path().join("missing.supr")))
        .await
        .unwrap_err();
    assert!(matches!(err, SuperfaceError::NotFound { .. }));
}

#[tokio::test]
async fn test_local_profile_must_match_expected_id() {
    let project = TestProject::new().unwrap();
    let path =
        project.write_file("a.supr", &fixtures::profile_source("other/profile", "1.0.0", &[])).unwrap();
    let (resolver, _) = resolver(&project, MockStore::new());

    let request = InstallRequest::Local {
        path,
        expected: Some(id()),
    };
    let err = resolver.resolve_profile(&request).await.unwrap_err();
    assert!(matches!(err, SuperfaceError::SyntaxError { .. }));
}

#[tokio::test]
async fn test_store_profile_without_version_pins_latest() {
    let project = TestProject::new().unwrap();
    let store = MockStore::new().with_profile(PROFILE_ID, "1.0.1", "").with_profile(PROFILE_ID, "1.0.2", "");
    let (resolver, store) = resolver(&project, store);

    let resolved = resolver.resolve_profile(&InstallRequest::store(id(), None)).await.unwrap();

    assert_eq!(
        resolved.source,
        ProfileSource::Store {
            version: "1.0.2".to_string()
        }
    );
    assert_eq!(store.calls(), vec![format!("latest:{PROFILE_ID}")]);
}

#[tokio::test]
async fn test_store_profile_with_version_checks_existence() {
    let project = TestProject::new().unwrap();
    let store = MockStore::new().with_profile(PROFILE_ID, "1.0.2", "");
    let (resolver, _) = resolver(&project, store);

    let resolved = resolver
        .resolve_profile(&InstallRequest::store(id(), Some("1.0.2".to_string())))
        .await
        .unwrap();
    assert_eq!(
        resolved.source,
        ProfileSource::Store {
            version: "1.0.2".to_string()
        }
    );

    let err = resolver
        .resolve_profile(&InstallRequest::store(id(), Some("9.9.9".to_string())))
        .await
        .unwrap_err();
    assert!(matches!(err, SuperfaceError::NotFound { .. }));
}

#[tokio::test]
async fn test_store_outage_is_store_unavailable() {
    let project = TestProject::new().unwrap();
    let (resolver, _) = resolver(&project, MockStore::new().unavailable());

    let err = resolver.resolve_profile(&InstallRequest::store(id(), None)).await.unwrap_err();
    assert!(matches!(err, SuperfaceError::StoreUnavailable { .. }));
}

#[test]
fn test_provider_request_parse() {
    assert_eq!(
        ProviderRequest::parse("swapi").unwrap(),
        ProviderRequest::Store {
            name: "swapi".to_string()
        }
    );
    assert_eq!(
        ProviderRequest::parse("mock.json").unwrap(),
        ProviderRequest::Local {
            name: "mock".to_string(),
            path: PathBuf::from("mock.json")
        }
    );
    assert!(matches!(ProviderRequest::parse("./providers/swapi"), Ok(ProviderRequest::Local { .. })));
    assert!(matches!(
        ProviderRequest::parse("SWAPI"),
        Err(SuperfaceError::InvalidIdentifier { .. })
    ));
}

#[tokio::test]
async fn test_provider_resolution() {
    let project = TestProject::new().unwrap();
    let path = project.write_file("providers/mock.json", &fixtures::provider_json("mock")).unwrap();
    let store = MockStore::new().with_provider("swapi", &fixtures::provider_json("swapi"));
    let (resolver, store) = resolver(&project, store);

    let local = resolver
        .resolve_provider(&ProviderRequest::Local {
            name: "mock".to_string(),
            path,
        })
        .await
        .unwrap();
    assert_eq!(
        local.source,
        ProviderSource::Local {
            file: "../providers/mock.json".to_string()
        }
    );

    let remote = resolver
        .resolve_provider(&ProviderRequest::Store {
            name: "swapi".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(remote.source, ProviderSource::Store);

    let err = resolver
        .resolve_provider(&ProviderRequest::Store {
            name: "unknown".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SuperfaceError::NotFound { .. }));
    assert_eq!(store.calls(), vec!["provider:swapi", "provider:unknown"]);
}

#[tokio::test]
async fn test_provider_definitions_are_memoized() {
    let project = TestProject::new().unwrap();
    let store = MockStore::new().with_provider("swapi", &fixtures::provider_json("swapi"));
    let (resolver, store) = resolver(&project, store);

    for _ in 0..3 {
        resolver.load_provider("swapi", &ProviderSource::Store).await.unwrap();
    }
    assert_eq!(store.calls(), vec!["provider:swapi"]);
}

#[tokio::test]
async fn test_load_sources_from_manifest_entries() {
    let project = TestProject::new().unwrap();
    project
        .write_file("profiles/character.supr", &fixtures::profile_source(PROFILE_ID, "1.0.2", &["Get"]))
        .unwrap();
    let store = MockStore::new().with_map(
        &format!("{PROFILE_ID}.swapi@1.0.2"),
        &fixtures::map_source(PROFILE_ID, "1.0", "swapi", &["Get"]),
    );
    let (resolver, store) = resolver(&project, store);

    let profile = resolver
        .load_profile(
            &id(),
            &ProfileSource::Local {
                file: "../profiles/character.supr".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(profile.usecases, vec!["Get"]);

    let map = resolver.load_map(&id(), "1.0.2", "swapi", &BindingSource::store_default()).await.unwrap();
    assert_eq!(map.provider, "swapi");
    assert_eq!(store.calls(), vec![format!("map:{PROFILE_ID}.swapi@1.0.2")]);

    let err = resolver
        .load_map(
            &id(),
            "1.0.2",
            "swapi",
            &BindingSource::Local {
                file: "../maps/missing.suma".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SuperfaceError::NotFound { .. }));
}
