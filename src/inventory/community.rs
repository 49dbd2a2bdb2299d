//! Snapshot inventory source: the community `/inventory` endpoint.
//!
//! The endpoint answers with two parallel collections, `assets` and
//! `descriptions`. An empty inventory comes back as
//! `{"total_inventory_count": 0, "success": 1}` with both arrays omitted.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{BackendVariant, ExportConfig};
use crate::error::ExportError;
use crate::http_client::{build_url, redacted};
use crate::profile::CanonicalId;

use super::{
    HoldingDetail, InventoryContents, InventorySource, ItemDescription, RawHolding, SERVICE,
    classify_status, de_flag, de_opt_scalar, de_scalar,
};

#[derive(Debug, Deserialize)]
struct CommunityAsset {
    #[serde(deserialize_with = "de_scalar")]
    assetid: String,
    #[serde(deserialize_with = "de_scalar")]
    classid: String,
    #[serde(default = "zero", deserialize_with = "de_scalar")]
    instanceid: String,
    #[serde(default = "one", deserialize_with = "de_scalar")]
    amount: String,
}

#[derive(Debug, Deserialize)]
struct CommunityDescription {
    #[serde(deserialize_with = "de_scalar")]
    classid: String,
    #[serde(default = "zero", deserialize_with = "de_scalar")]
    instanceid: String,
    #[serde(default, deserialize_with = "de_opt_scalar")]
    name: Option<String>,
    #[serde(default, deserialize_with = "de_opt_scalar")]
    market_hash_name: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "de_opt_scalar")]
    item_type: Option<String>,
    #[serde(default, deserialize_with = "de_flag")]
    tradable: bool,
    #[serde(default, deserialize_with = "de_flag")]
    marketable: bool,
}

fn zero() -> String {
    "0".to_string()
}

fn one() -> String {
    "1".to_string()
}

impl From<CommunityAsset> for RawHolding {
    fn from(asset: CommunityAsset) -> Self {
        Self {
            class_key: asset.classid,
            instance_key: asset.instanceid,
            amount: asset.amount,
            detail: HoldingDetail::Snapshot {
                asset_id: asset.assetid,
            },
        }
    }
}

impl From<CommunityDescription> for ItemDescription {
    fn from(description: CommunityDescription) -> Self {
        Self {
            class_key: description.classid,
            instance_key: description.instanceid,
            name: description.name,
            market_hash_name: description.market_hash_name,
            item_type: description.item_type,
            tradable: description.tradable,
            marketable: description.marketable,
        }
    }
}

/// [`InventorySource`] for the community inventory endpoint.
///
/// Requests at most `page_size` items in a single call.
pub struct CommunityInventorySource {
    client: Client,
    base_url: String,
    app_id: u32,
    context_id: u32,
    page_size: u32,
}

impl CommunityInventorySource {
    /// Creates a source over `client` using the config's community host,
    /// game catalog and page size.
    #[must_use]
    pub fn new(client: Client, config: &ExportConfig) -> Self {
        Self {
            client,
            base_url: config.community_base_url.clone(),
            app_id: config.app_id,
            context_id: config.context_id,
            page_size: config.page_size,
        }
    }
}

impl std::fmt::Debug for CommunityInventorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommunityInventorySource")
            .field("base_url", &self.base_url)
            .field("app_id", &self.app_id)
            .field("context_id", &self.context_id)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl InventorySource for CommunityInventorySource {
    fn variant(&self) -> BackendVariant {
        BackendVariant::Snapshot
    }

    #[tracing::instrument(skip(self, steam_id), fields(backend = "snapshot", steam_id = %steam_id))]
    async fn fetch(&self, steam_id: &CanonicalId) -> Result<InventoryContents, ExportError> {
        let path = format!("/inventory/{}/{}/{}", steam_id, self.app_id, self.context_id);
        let count = self.page_size.to_string();
        let url = build_url(
            &self.base_url,
            &path,
            &[("l", "english"), ("count", count.as_str())],
        )?;
        debug!(api_url = %redacted(&url), "Fetching community inventory");

        let response = self.client.get(url).send().await.map_err(|e| {
            let e = e.without_url();
            warn!(error = %e, "Community inventory request failed");
            ExportError::upstream(SERVICE, format!("request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Community inventory returned error status");
            return Err(classify_status(steam_id, status));
        }

        let body = response.text().await.map_err(|e| {
            let e = e.without_url();
            warn!(error = %e, "Failed to read community inventory body");
            ExportError::upstream(SERVICE, format!("body read failed: {e}"))
        })?;

        parse_snapshot(steam_id, &body)
    }
}

/// Normalizes a community inventory body.
fn parse_snapshot(steam_id: &CanonicalId, body: &str) -> Result<InventoryContents, ExportError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "Community inventory body is not JSON");
        ExportError::upstream(SERVICE, "unparseable inventory response")
    })?;

    let malformed = |what: &str| {
        warn!(problem = what, "Community inventory response is malformed");
        ExportError::not_found(steam_id.as_str(), format!("malformed response: {what}"))
    };

    let Some(object) = value.as_object() else {
        return Err(malformed("body is not an object"));
    };

    let Some(assets) = object.get("assets") else {
        let total = object
            .get("total_inventory_count")
            .and_then(serde_json::Value::as_u64);
        if total == Some(0) {
            debug!("Community inventory reports zero items");
            return Err(ExportError::empty_inventory(steam_id.as_str()));
        }
        return Err(malformed("missing assets"));
    };

    let assets: Vec<CommunityAsset> =
        serde_json::from_value(assets.clone()).map_err(|_| malformed("invalid assets"))?;
    if assets.is_empty() {
        return Err(ExportError::empty_inventory(steam_id.as_str()));
    }

    let descriptions = object
        .get("descriptions")
        .ok_or_else(|| malformed("missing descriptions"))?;
    let descriptions: Vec<CommunityDescription> = serde_json::from_value(descriptions.clone())
        .map_err(|_| malformed("invalid descriptions"))?;

    debug!(
        assets = assets.len(),
        descriptions = descriptions.len(),
        "Parsed community inventory"
    );

    Ok(InventoryContents {
        holdings: assets.into_iter().map(RawHolding::from).collect(),
        descriptions: Some(descriptions.into_iter().map(ItemDescription::from).collect()),
    })
}
