//! Alias resolution against the Steam `ResolveVanityURL` API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::http_client::{build_url, redacted};

use super::CanonicalId;

const VANITY_PATH: &str = "/ISteamUser/ResolveVanityURL/v0001/";

/// Success flag the lookup service reports for a resolved alias.
pub const LOOKUP_SUCCESS: i64 = 1;

const SERVICE: &str = "alias lookup";

/// Outcome reported by an alias lookup service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasLookupResult {
    /// Service success flag (`1` means resolved).
    pub success: i64,
    /// Canonical id, present when resolved.
    pub steam_id: Option<String>,
}

/// External alias-to-identifier lookup.
///
/// Uses `async_trait` so the pipeline can hold a `Box<dyn AliasLookup>`.
#[async_trait]
pub trait AliasLookup: Send + Sync {
    /// Looks up `alias` once. No retries.
    async fn lookup(&self, alias: &str) -> Result<AliasLookupResult, ExportError>;
}

#[derive(Debug, Deserialize)]
struct VanityEnvelope {
    response: VanityResponse,
}

#[derive(Debug, Deserialize)]
struct VanityResponse {
    success: i64,
    steamid: Option<String>,
    message: Option<String>,
}

/// [`AliasLookup`] backed by `ISteamUser/ResolveVanityURL`.
pub struct VanityUrlLookup {
    client: Client,
    base_url: String,
    api_key: String,
}

impl VanityUrlLookup {
    /// Creates a lookup over `client` using the config's API host and key.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Configuration`] when the API key is missing.
    pub fn new(client: Client, config: &ExportConfig) -> Result<Self, ExportError> {
        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            api_key: config.require_api_key()?.to_string(),
        })
    }
}

impl std::fmt::Debug for VanityUrlLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VanityUrlLookup")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AliasLookup for VanityUrlLookup {
    #[tracing::instrument(skip(self), fields(service = SERVICE))]
    async fn lookup(&self, alias: &str) -> Result<AliasLookupResult, ExportError> {
        let url = build_url(
            &self.base_url,
            VANITY_PATH,
            &[("key", self.api_key.as_str()), ("vanityurl", alias)],
        )?;
        debug!(api_url = %redacted(&url), "Calling alias lookup");

        let response = self.client.get(url).send().await.map_err(|e| {
            let e = e.without_url();
            warn!(error = %e, "Alias lookup request failed");
            ExportError::upstream(SERVICE, format!("request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Alias lookup returned error status");
            return Err(ExportError::upstream(
                SERVICE,
                format!("HTTP {}", status.as_u16()),
            ));
        }

        let body = response.json::<VanityEnvelope>().await.map_err(|e| {
            let e = e.without_url();
            warn!(error = %e, "Failed to parse alias lookup response");
            ExportError::upstream(SERVICE, "unexpected response format")
        })?;

        debug!(
            success = body.response.success,
            message = ?body.response.message,
            "Alias lookup answered"
        );
        Ok(AliasLookupResult {
            success: body.response.success,
            steam_id: body.response.steamid,
        })
    }
}

/// Resolves an identifier candidate into a [`CanonicalId`].
///
/// A candidate that already is a canonical id is returned without any lookup.
/// Anything else is looked up exactly once.
///
/// # Errors
///
/// - [`ExportError::Resolution`] when the lookup's success flag is not `1`
/// - [`ExportError::Upstream`] when the lookup fails or returns a malformed id
#[tracing::instrument(skip(lookup))]
pub async fn resolve_profile_id(
    token: &str,
    lookup: &dyn AliasLookup,
) -> Result<CanonicalId, ExportError> {
    if let Some(id) = CanonicalId::parse(token) {
        debug!(steam_id = %id, "Token is already a canonical id");
        return Ok(id);
    }

    let result = lookup.lookup(token).await?;
    if result.success != LOOKUP_SUCCESS {
        debug!(success = result.success, "Alias did not resolve");
        return Err(ExportError::resolution(token, result.success));
    }

    let raw_id = result.steam_id.unwrap_or_default();
    CanonicalId::parse(&raw_id).ok_or_else(|| {
        warn!(steam_id = %raw_id, "Alias lookup returned a malformed id");
        ExportError::upstream(SERVICE, format!("malformed id '{raw_id}' in lookup response"))
    })
}
