//! In-memory store for tests.

use crate::core::{ProfileId, SuperfaceError};
use crate::document::ProviderDefinition;
use crate::store::{MapAddress, StoreClient};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// A [`StoreClient`] serving canned content.
///
/// Every call is recorded (`latest:<id>`, `profile:<id>@<v>`, `map:<address>`,
/// `provider:<name>`) so tests can assert what was fetched, including that
/// nothing was.
#[derive(Debug, Default)]
pub struct MockStore {
    latest: HashMap<String, String>,
    profiles: HashMap<String, String>,
    maps: HashMap<String, String>,
    providers: HashMap<String, String>,
    unavailable: bool,
    calls: Mutex<Vec<String>>,
}

impl MockStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a profile version; the last published version becomes the latest.
    #[must_use]
    pub fn with_profile(mut self, id: &str, version: &str, source: &str) -> Self {
        self.profiles.insert(format!("{id}@{version}"), source.to_string());
        self.latest.insert(id.to_string(), version.to_string());
        self
    }

    /// Publish a map under its store address (`profile.provider[.variant]@version`).
    #[must_use]
    pub fn with_map(mut self, address: &str, source: &str) -> Self {
        self.maps.insert(address.to_string(), source.to_string());
        self
    }

    /// Publish a provider definition.
    #[must_use]
    pub fn with_provider(mut self, name: &str, definition: &str) -> Self {
        self.providers.insert(name.to_string(), definition.to_string());
        self
    }

    /// Make every call fail with [`SuperfaceError::StoreUnavailable`].
    #[must_use]
    pub const fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Calls made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) -> Result<(), SuperfaceError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call.clone());
        }
        if self.unavailable {
            return Err(SuperfaceError::StoreUnavailable {
                operation: call,
                reason: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl StoreClient for MockStore {
    async fn fetch_latest_version(&self, profile: &ProfileId) -> Result<String, SuperfaceError> {
        self.record(format!("latest:{profile}"))?;
        self.latest
            .get(&profile.to_string())
            .cloned()
            .ok_or_else(|| SuperfaceError::not_found("profile in store", profile.to_string()))
    }

    async fn fetch_profile_source(
        &self,
        profile: &ProfileId,
        version: &str,
    ) -> Result<String, SuperfaceError> {
        let key = format!("{profile}@{version}");
        self.record(format!("profile:{key}"))?;
        self.profiles
            .get(&key)
            .cloned()
            .ok_or_else(|| SuperfaceError::not_found("profile in store", key))
    }

    async fn fetch_map_source(&self, map: &MapAddress) -> Result<String, SuperfaceError> {
        let key = map.to_string();
        self.record(format!("map:{key}"))?;
        self.maps.get(&key).cloned().ok_or_else(|| SuperfaceError::not_found("map in store", key))
    }

    async fn fetch_provider_definition(
        &self,
        provider: &str,
    ) -> Result<ProviderDefinition, SuperfaceError> {
        self.record(format!("provider:{provider}"))?;
        let definition = self
            .providers
            .get(provider)
            .ok_or_else(|| SuperfaceError::not_found("provider in store", provider))?;
        ProviderDefinition::from_json(definition, &format!("providers/{provider}"))
    }
}
