//! Explicit pipeline configuration.
//!
//! An [`ExportConfig`] is built once (by the binary: file, environment, flags)
//! and handed to [`crate::ExportPipeline::new`]. Nothing in the library reads
//! the environment.

use std::fmt;
use std::str::FromStr;

use crate::error::ExportError;

/// Largest item count requested from the snapshot endpoint in one call.
pub const MAX_PAGE_SIZE: u32 = 5000;

/// Default game catalog (Counter-Strike 2).
pub const DEFAULT_APP_ID: u32 = 730;
/// Default inventory context for the configured game.
pub const DEFAULT_CONTEXT_ID: u32 = 2;

/// Default community host serving the snapshot inventory endpoint.
pub const DEFAULT_COMMUNITY_BASE_URL: &str = "https://steamcommunity.com";
/// Default Web API host serving alias lookup and the legacy endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.steampowered.com";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Which inventory backend serves requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendVariant {
    /// Community inventory endpoint: parallel `assets` and `descriptions`.
    #[default]
    Snapshot,
    /// Web API `GetPlayerItems`: status envelope with bare `items`.
    Legacy,
}

impl BackendVariant {
    /// Stable label used in config files and CLI flags.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::Legacy => "legacy",
        }
    }

    /// Prefix of the suggested download filename.
    #[must_use]
    pub fn filename_prefix(self) -> &'static str {
        match self {
            Self::Snapshot => "inventory",
            Self::Legacy => "economy_items",
        }
    }
}

impl fmt::Display for BackendVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snapshot" | "community" => Ok(Self::Snapshot),
            "legacy" | "economy" => Ok(Self::Legacy),
            other => Err(format!(
                "unknown backend '{other}', expected 'snapshot' or 'legacy'"
            )),
        }
    }
}

/// Configuration consumed by the export pipeline.
#[derive(Clone)]
pub struct ExportConfig {
    /// Steam Web API key (alias lookup and legacy backend).
    pub api_key: Option<String>,
    /// Active inventory backend.
    pub backend: BackendVariant,
    /// Game catalog whose inventory is exported.
    pub app_id: u32,
    /// Inventory context inside the game catalog.
    pub context_id: u32,
    /// Item count cap for the snapshot request.
    pub page_size: u32,
    /// Base URL of the community host.
    pub community_base_url: String,
    /// Base URL of the Web API host.
    pub api_base_url: String,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// HTTP total request timeout in seconds.
    pub read_timeout_secs: u64,
}

impl ExportConfig {
    /// Creates a config with defaults and the given API key.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            ..Self::default()
        }
    }

    /// Returns the API key, or a `Configuration` error when it is absent or blank.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Configuration`] when no usable key is configured.
    pub fn require_api_key(&self) -> Result<&str, ExportError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ExportError::configuration("Steam API key is not configured"))
    }

    /// Validates values before the pipeline is built.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Configuration`] for a missing API key, a page
    /// size outside `1..=5000`, or a zero timeout.
    pub fn validate(&self) -> Result<(), ExportError> {
        self.require_api_key()?;

        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(ExportError::configuration(format!(
                "page_size {} is out of range 1..={MAX_PAGE_SIZE}",
                self.page_size
            )));
        }
        if self.connect_timeout_secs == 0 || self.read_timeout_secs == 0 {
            return Err(ExportError::configuration("HTTP timeouts must be at least 1 second"));
        }
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            backend: BackendVariant::default(),
            app_id: DEFAULT_APP_ID,
            context_id: DEFAULT_CONTEXT_ID,
            page_size: MAX_PAGE_SIZE,
            community_base_url: DEFAULT_COMMUNITY_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("backend", &self.backend)
            .field("app_id", &self.app_id)
            .field("context_id", &self.context_id)
            .field("page_size", &self.page_size)
            .field("community_base_url", &self.community_base_url)
            .field("api_base_url", &self.api_base_url)
            .finish_non_exhaustive()
    }
}
