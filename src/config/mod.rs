//! Runtime configuration read from the environment.
//!
//! The CLI has no configuration file. The only tunables are the store
//! endpoint and its access token:
//!
//! | Variable | Default | Purpose |
//! |----------|---------|---------|
//! | `SUPERFACE_API_URL` | `https://superface.ai` | Store base URL |
//! | `SUPERFACE_SDK_TOKEN` | unset | Token sent as `Authorization: SUPERFACE-SDK-TOKEN <token>` |
//!
//! Process-level flags (`--verbose`, `--no-progress`) are handled by
//! [`crate::cli::CliConfig`].

use crate::constants::{DEFAULT_STORE_URL, STORE_REQUEST_TIMEOUT, STORE_TOKEN_ENV, STORE_URL_ENV};
use std::fmt;
use std::time::Duration;

/// Connection settings for [`crate::store::HttpStoreClient`].
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Base URL without a trailing slash
    pub base_url: String,
    /// SDK token, if configured
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl StoreConfig {
    /// Read the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let base_url = non_empty(STORE_URL_ENV).unwrap_or_else(|| DEFAULT_STORE_URL.to_string());

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: non_empty(STORE_TOKEN_ENV),
            timeout: STORE_REQUEST_TIMEOUT,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

// Keep the token out of debug logs
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.base_url, "https://superface.ai");
        assert_eq!(config.token, None);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> =
            [(STORE_URL_ENV, "http://localhost:3000/"), (STORE_TOKEN_ENV, "sfs_abc")].into();
        let config = StoreConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.token.as_deref(), Some("sfs_abc"));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = StoreConfig::from_lookup(|_| Some("  ".to_string()));
        assert_eq!(config.base_url, DEFAULT_STORE_URL);
        assert_eq!(config.token, None);
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = StoreConfig::from_lookup(|key| (key == STORE_TOKEN_ENV).then(|| "secret".to_string()));
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    #[serial]
    fn test_from_env_reads_process_environment() {
        // SAFETY: serialized with every other test touching the environment
        unsafe {
            std::env::set_var(STORE_URL_ENV, "http://store.test");
        }
        let config = StoreConfig::from_env();
        unsafe {
            std::env::remove_var(STORE_URL_ENV);
        }

        assert_eq!(config.base_url, "http://store.test");
    }
}
