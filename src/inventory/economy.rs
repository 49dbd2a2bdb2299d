//! Legacy inventory source: the Web API `IEconItems_{app}/GetPlayerItems`.
//!
//! Answers with `{"result": {"status": N, "items": [...]}}`. Items carry
//! economy-internal fields only; there is no description set.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{BackendVariant, ExportConfig};
use crate::error::ExportError;
use crate::http_client::{build_url, redacted};
use crate::profile::CanonicalId;

use super::{
    HoldingDetail, InventoryContents, InventorySource, RawHolding, SERVICE, classify_status,
    de_opt_scalar, de_scalar,
};

/// `result.status` for a readable backpack.
const STATUS_OK: i64 = 1;
/// `result.status` for a steamid the backend rejects.
const STATUS_INVALID_ID: i64 = 8;
/// `result.status` for a private backpack.
const STATUS_PRIVATE: i64 = 15;

#[derive(Debug, Deserialize)]
struct EconomyEnvelope {
    result: Option<EconomyResult>,
}

#[derive(Debug, Deserialize)]
struct EconomyResult {
    status: Option<i64>,
    items: Option<Vec<EconomyItem>>,
}

#[derive(Debug, Deserialize)]
struct EconomyItem {
    #[serde(deserialize_with = "de_scalar")]
    id: String,
    #[serde(default, deserialize_with = "de_opt_scalar")]
    original_id: Option<String>,
    #[serde(deserialize_with = "de_scalar")]
    defindex: String,
    #[serde(default, deserialize_with = "de_opt_scalar")]
    level: Option<String>,
    #[serde(default, deserialize_with = "de_opt_scalar")]
    quality: Option<String>,
    #[serde(default, deserialize_with = "de_opt_scalar")]
    quantity: Option<String>,
    #[serde(default, deserialize_with = "de_opt_scalar")]
    origin: Option<String>,
}

impl From<EconomyItem> for RawHolding {
    fn from(item: EconomyItem) -> Self {
        Self {
            class_key: item.defindex,
            instance_key: item.quality.unwrap_or_default(),
            amount: item.quantity.unwrap_or_else(|| "1".to_string()),
            detail: HoldingDetail::Legacy {
                item_id: item.id,
                original_id: item.original_id,
                level: item.level,
                origin: item.origin,
            },
        }
    }
}

/// [`InventorySource`] for the keyed `GetPlayerItems` endpoint.
pub struct EconomyItemsSource {
    client: Client,
    base_url: String,
    app_id: u32,
    api_key: String,
}

impl EconomyItemsSource {
    /// Creates a source over `client` using the config's API host, game
    /// catalog and key.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Configuration`] when the API key is missing.
    pub fn new(client: Client, config: &ExportConfig) -> Result<Self, ExportError> {
        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            app_id: config.app_id,
            api_key: config.require_api_key()?.to_string(),
        })
    }

    fn endpoint_path(&self) -> String {
        format!("/IEconItems_{}/GetPlayerItems/v0001/", self.app_id)
    }
}

impl std::fmt::Debug for EconomyItemsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EconomyItemsSource")
            .field("base_url", &self.base_url)
            .field("app_id", &self.app_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl InventorySource for EconomyItemsSource {
    fn variant(&self) -> BackendVariant {
        BackendVariant::Legacy
    }

    #[tracing::instrument(skip(self, steam_id), fields(backend = "legacy", steam_id = %steam_id))]
    async fn fetch(&self, steam_id: &CanonicalId) -> Result<InventoryContents, ExportError> {
        let endpoint = self.endpoint_path();
        let url = build_url(
            &self.base_url,
            &endpoint,
            &[("key", self.api_key.as_str()), ("steamid", steam_id.as_str())],
        )?;
        debug!(api_url = %redacted(&url), "Fetching economy items");

        let response = self.client.get(url).send().await.map_err(|e| {
            let e = e.without_url();
            warn!(error = %e, "Economy items request failed");
            ExportError::upstream(SERVICE, format!("request failed: {e}"))
        })?;

        let status = response.status();
        if status == StatusCode::GONE {
            warn!(endpoint = %endpoint, "Economy items endpoint answered 410 Gone");
            return Err(ExportError::permanently_gone(endpoint));
        }
        if !status.is_success() {
            warn!(status = status.as_u16(), "Economy items returned error status");
            return Err(classify_status(steam_id, status));
        }

        let body = response.text().await.map_err(|e| {
            let e = e.without_url();
            warn!(error = %e, "Failed to read economy items body");
            ExportError::upstream(SERVICE, format!("body read failed: {e}"))
        })?;

        parse_economy(steam_id, &body)
    }
}

/// Normalizes a `GetPlayerItems` body.
fn parse_economy(steam_id: &CanonicalId, body: &str) -> Result<InventoryContents, ExportError> {
    let envelope: EconomyEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) if e.is_syntax() || e.is_eof() => {
            warn!(error = %e, "Economy items body is not JSON");
            return Err(ExportError::upstream(SERVICE, "unparseable inventory response"));
        }
        Err(e) => {
            warn!(error = %e, "Economy items response is malformed");
            return Err(ExportError::not_found(
                steam_id.as_str(),
                "malformed response: unexpected shape",
            ));
        }
    };

    let Some(result) = envelope.result else {
        return Err(ExportError::not_found(
            steam_id.as_str(),
            "malformed response: missing result",
        ));
    };

    match result.status {
        Some(STATUS_OK) => {}
        Some(STATUS_PRIVATE) => {
            return Err(ExportError::access(steam_id.as_str(), "backpack is private"));
        }
        Some(STATUS_INVALID_ID) => {
            return Err(ExportError::access(steam_id.as_str(), "steamid is invalid"));
        }
        other => {
            return Err(ExportError::access(
                steam_id.as_str(),
                format!("result status {other:?}"),
            ));
        }
    }

    let Some(items) = result.items else {
        return Err(ExportError::not_found(
            steam_id.as_str(),
            "malformed response: missing items",
        ));
    };
    if items.is_empty() {
        return Err(ExportError::empty_inventory(steam_id.as_str()));
    }

    debug!(items = items.len(), "Parsed economy items");
    Ok(InventoryContents {
        holdings: items.into_iter().map(RawHolding::from).collect(),
        descriptions: None,
    })
}
