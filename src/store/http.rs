//! HTTP implementation of [`StoreClient`].
//!
//! | Operation | Request | `Accept` |
//! |-----------|---------|----------|
//! | latest version | `GET {base}/{profile}` | `application/json` |
//! | profile source | `GET {base}/{profile}@{version}` | `application/vnd.superface.profile` |
//! | map source | `GET {base}/{profile}.{provider}[.{variant}]@{version}` | `application/vnd.superface.map` |
//! | provider | `GET {base}/providers/{name}` | `application/json` |
//!
//! Connection errors, timeouts and 5xx responses are retried with exponential
//! backoff (100ms, 200ms) before surfacing as
//! [`SuperfaceError::StoreUnavailable`]. A 404 is [`SuperfaceError::NotFound`]
//! and is never retried.

use super::{MapAddress, StoreClient};
use crate::config::StoreConfig;
use crate::constants::{STORE_RETRY_ATTEMPTS, STORE_RETRY_BASE_DELAY_MS};
use crate::core::{ProfileId, SuperfaceError, validate_version};
use crate::document::ProviderDefinition;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, warn};

const ACCEPT_JSON: &str = "application/json";
const ACCEPT_PROFILE: &str = "application/vnd.superface.profile";
const ACCEPT_MAP: &str = "application/vnd.superface.map";

/// Failure of a single request attempt.
#[derive(Debug)]
enum RequestError {
    Transport(reqwest::Error),
    Status(StatusCode),
}

impl RequestError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status(status) => status.is_server_error(),
        }
    }

    fn into_error(self, what: &str, location: &str, operation: &str) -> SuperfaceError {
        match self {
            Self::Status(StatusCode::NOT_FOUND) => SuperfaceError::not_found(what, location),
            Self::Status(status) => SuperfaceError::StoreUnavailable {
                operation: operation.to_string(),
                reason: format!("HTTP {status}"),
            },
            Self::Transport(e) => SuperfaceError::StoreUnavailable {
                operation: operation.to_string(),
                reason: e.to_string(),
            },
        }
    }
}

#[derive(Deserialize)]
struct ProfileInfo {
    profile_version: String,
}

/// Store client talking to the registry over HTTP.
#[derive(Debug, Clone)]
pub struct HttpStoreClient {
    client: reqwest::Client,
    config: StoreConfig,
}

impl HttpStoreClient {
    /// Create a client with the given configuration.
    pub fn new(config: StoreConfig) -> Result<Self, SuperfaceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("superface-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SuperfaceError::Other {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            config,
        })
    }

    /// Create a client configured from `SUPERFACE_API_URL` and `SUPERFACE_SDK_TOKEN`.
    pub fn from_env() -> Result<Self, SuperfaceError> {
        Self::new(StoreConfig::from_env())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    async fn attempt(&self, url: &str, accept: &str) -> Result<String, RequestError> {
        let mut request = self.client.get(url).header(ACCEPT, accept);
        if let Some(token) = &self.config.token {
            request = request.header(AUTHORIZATION, format!("SUPERFACE-SDK-TOKEN {token}"));
        }

        let response = request.send().await.map_err(RequestError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::Status(status));
        }
        response.text().await.map_err(RequestError::Transport)
    }

    /// GET `path` with retries, labelling failures with `what` and `operation`.
    async fn get(
        &self,
        path: &str,
        accept: &str,
        what: &str,
        operation: &str,
    ) -> Result<String, SuperfaceError> {
        let url = self.url(path);
        debug!("GET {url} ({accept})");

        // 100ms, 200ms, ... between attempts
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(STORE_RETRY_BASE_DELAY_MS / 2)
            .take(STORE_RETRY_ATTEMPTS.saturating_sub(1));

        // Non-transient failures resolve the retry future with an inner error
        let url = url.as_str();
        Retry::spawn(strategy, || async move {
            match self.attempt(url, accept).await {
                Err(e) if e.is_transient() => {
                    warn!("Store request to {url} failed, retrying: {e:?}");
                    Err(e)
                }
                other => Ok(other),
            }
        })
        .await
        .and_then(|response| response)
        .map_err(|e| e.into_error(what, path, operation))
    }
}

#[async_trait]
impl StoreClient for HttpStoreClient {
    async fn fetch_latest_version(&self, profile: &ProfileId) -> Result<String, SuperfaceError> {
        let path = profile.to_string();
        let body = self
            .get(
                &path,
                ACCEPT_JSON,
                "profile in store",
                &format!("fetching latest version of {profile}"),
            )
            .await?;

        let info: ProfileInfo = serde_json::from_str(&body).map_err(|e| SuperfaceError::SyntaxError {
            origin: self.url(&path),
            reason: e.to_string(),
        })?;
        validate_version(&info.profile_version).map_err(|e| SuperfaceError::SyntaxError {
            origin: self.url(&path),
            reason: e.to_string(),
        })
    }

    async fn fetch_profile_source(
        &self,
        profile: &ProfileId,
        version: &str,
    ) -> Result<String, SuperfaceError> {
        self.get(
            &format!("{profile}@{version}"),
            ACCEPT_PROFILE,
            "profile in store",
            &format!("fetching profile {profile}@{version}"),
        )
        .await
    }

    async fn fetch_map_source(&self, map: &MapAddress) -> Result<String, SuperfaceError> {
        self.get(&map.to_string(), ACCEPT_MAP, "map in store", &format!("fetching map {map}")).await
    }

    async fn fetch_provider_definition(
        &self,
        provider: &str,
    ) -> Result<ProviderDefinition, SuperfaceError> {
        let path = format!("providers/{provider}");
        let body = self
            .get(
                &path,
                ACCEPT_JSON,
                "provider in store",
                &format!("fetching provider {provider}"),
            )
            .await?;
        ProviderDefinition::from_json(&body, &self.url(&path))
    }
}
