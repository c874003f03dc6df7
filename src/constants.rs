//! Global constants used throughout the Superface CLI.
//!
//! This module contains file layout conventions, limits, and network
//! parameters that are used across multiple modules. Defining them centrally
//! keeps magic values discoverable.

use std::time::Duration;

/// Directory (relative to the project root) holding the manifest.
pub const MANIFEST_DIR: &str = "superface";

/// File name of the manifest inside [`MANIFEST_DIR`].
pub const MANIFEST_FILE: &str = "super.json";

/// Upper bound for the number of parent directories scanned for a manifest.
///
/// A scan request above this value is a configuration error, not a miss.
pub const MAX_SCAN_LEVELS: usize = 5;

/// Prefix used by the string shorthand for local entries (`"file:../x.supr"`).
pub const FILE_URI_PREFIX: &str = "file:";

/// Extension of profile source documents.
pub const PROFILE_EXTENSION: &str = "supr";

/// Extension of map source documents.
pub const MAP_EXTENSION: &str = "suma";

/// Default base URL of the remote store.
pub const DEFAULT_STORE_URL: &str = "https://superface.ai";

/// Environment variable overriding the store base URL.
pub const STORE_URL_ENV: &str = "SUPERFACE_API_URL";

/// Environment variable carrying the store access token.
pub const STORE_TOKEN_ENV: &str = "SUPERFACE_SDK_TOKEN";

/// Environment variable disabling progress indicators.
pub const NO_PROGRESS_ENV: &str = "SUPERFACE_NO_PROGRESS";

/// Timeout for a single store request (30 seconds).
pub const STORE_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Number of attempts for retriable store requests.
pub const STORE_RETRY_ATTEMPTS: usize = 3;

/// Starting delay for store retry backoff (100ms), doubled on every attempt.
pub const STORE_RETRY_BASE_DELAY_MS: u64 = 100;
