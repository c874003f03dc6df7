//! Remote store collaborator.
//!
//! The store publishes versioned profile sources, the maps implementing them
//! and provider definitions. Engines only talk to it through the
//! [`StoreClient`] trait so tests can substitute an in-memory store and assert
//! that no network access happened; [`HttpStoreClient`] is the production
//! implementation.
//!
//! # Error Mapping
//!
//! - a missing entry is [`SuperfaceError::NotFound`]
//! - connection failures, timeouts and server errors are
//!   [`SuperfaceError::StoreUnavailable`]

pub mod http;

pub use http::HttpStoreClient;

use crate::core::{ProfileId, SuperfaceError};
use crate::document::ProviderDefinition;
use async_trait::async_trait;
use std::fmt;

/// Store address of a map: `<profileId>.<provider>[.<variant>]@<version>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapAddress {
    /// Profile the map implements
    pub profile: ProfileId,
    /// Profile version
    pub version: String,
    /// Provider the map targets
    pub provider: String,
    /// Map variant, when not the default one
    pub variant: Option<String>,
}

impl fmt::Display for MapAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.profile, self.provider)?;
        if let Some(variant) = &self.variant {
            write!(f, ".{variant}")?;
        }
        write!(f, "@{}", self.version)
    }
}

/// Read access to the remote store.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Latest published version of a profile.
    async fn fetch_latest_version(&self, profile: &ProfileId) -> Result<String, SuperfaceError>;

    /// Source text of an exact profile version.
    async fn fetch_profile_source(
        &self,
        profile: &ProfileId,
        version: &str,
    ) -> Result<String, SuperfaceError>;

    /// Source text of a map.
    async fn fetch_map_source(&self, map: &MapAddress) -> Result<String, SuperfaceError>;

    /// Definition of a provider.
    async fn fetch_provider_definition(
        &self,
        provider: &str,
    ) -> Result<ProviderDefinition, SuperfaceError>;
}
