//! Inventory retrieval from one configured backend.
//!
//! Two backends answer the same question with incompatible shapes. Each one
//! implements [`InventorySource`] and normalizes its response into
//! [`InventoryContents`], so nothing downstream sees a raw backend shape.
//!
//! - [`CommunityInventorySource`] - Snapshot variant (`assets` + `descriptions`)
//! - [`EconomyItemsSource`] - Legacy variant (status envelope with `items`)

mod community;
mod economy;

pub use community::CommunityInventorySource;
pub use economy::EconomyItemsSource;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};

use crate::config::BackendVariant;
use crate::error::ExportError;
use crate::profile::CanonicalId;

/// Variant-specific fields carried by a holding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoldingDetail {
    /// Snapshot holding: instance-unique asset id.
    Snapshot {
        /// Unique asset id.
        asset_id: String,
    },
    /// Legacy holding: economy-internal fields only.
    Legacy {
        /// Current item id.
        item_id: String,
        /// Id the item had when first created.
        original_id: Option<String>,
        /// Item level.
        level: Option<String>,
        /// Origin code (drop, purchase, trade...).
        origin: Option<String>,
    },
}

/// One unit of inventory, keyed by its classification pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHolding {
    /// Item definition key (`classid`, or `defindex` on the legacy backend).
    pub class_key: String,
    /// Variant key (`instanceid`, or `quality` on the legacy backend).
    pub instance_key: String,
    /// Stack size.
    pub amount: String,
    /// Backend-specific fields.
    pub detail: HoldingDetail,
}

impl RawHolding {
    /// The join key shared with [`ItemDescription::join_key`].
    #[must_use]
    pub fn join_key(&self) -> String {
        join_key(&self.class_key, &self.instance_key)
    }
}

/// Display metadata for a classification pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDescription {
    /// Item definition key.
    pub class_key: String,
    /// Variant key.
    pub instance_key: String,
    /// Display name.
    pub name: Option<String>,
    /// Market listing name, when the backend provides one.
    pub market_hash_name: Option<String>,
    /// Category/type line.
    pub item_type: Option<String>,
    /// Whether the item can be traded.
    pub tradable: bool,
    /// Whether the item can be listed on the market.
    pub marketable: bool,
}

impl ItemDescription {
    /// The join key shared with [`RawHolding::join_key`].
    #[must_use]
    pub fn join_key(&self) -> String {
        join_key(&self.class_key, &self.instance_key)
    }
}

/// Composite key: the two classification keys concatenated with a separator
/// that cannot occur in either numeric key.
fn join_key(class_key: &str, instance_key: &str) -> String {
    format!("{class_key}_{instance_key}")
}

/// Normalized result of one inventory fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryContents {
    /// Holdings in backend order. Never empty.
    pub holdings: Vec<RawHolding>,
    /// Description set, or `None` when the backend has none.
    pub descriptions: Option<Vec<ItemDescription>>,
}

/// A backend that retrieves the inventory of one canonical id.
///
/// Uses `async_trait` so the pipeline can hold a `Box<dyn InventorySource>`.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Which backend variant this source implements.
    fn variant(&self) -> BackendVariant;

    /// Fetches the inventory once. No retries, no pagination.
    ///
    /// Empty inventories are reported as [`ExportError::EmptyInventory`].
    async fn fetch(&self, steam_id: &CanonicalId) -> Result<InventoryContents, ExportError>;
}

pub(crate) const SERVICE: &str = "inventory";

/// Maps a non-success HTTP status shared by both backends.
///
/// 410 is the legacy backend's own condition and is handled there first.
pub(crate) fn classify_status(steam_id: &CanonicalId, status: StatusCode) -> ExportError {
    let code = status.as_u16();
    match code {
        401 | 403 => ExportError::access(steam_id.as_str(), format!("HTTP {code}")),
        404 => ExportError::not_found(steam_id.as_str(), "HTTP 404"),
        _ => ExportError::upstream(SERVICE, format!("HTTP {code}")),
    }
}

/// Renders a JSON scalar (string or number) as text.
pub(crate) fn scalar_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            None
        }
    }
}

/// Deserializes a required string-or-number field as text.
pub(crate) fn de_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    scalar_text(&value).ok_or_else(|| serde::de::Error::custom("expected a string or number"))
}

/// Deserializes an optional string-or-number field as text; `null` is absent.
pub(crate) fn de_opt_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_text))
}

/// Deserializes a `0`/`1`, boolean or `"1"`/`"true"` flag.
pub(crate) fn de_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Bool(b)) => b,
        Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(serde_json::Value::String(s)) => matches!(s.trim(), "1" | "true" | "True"),
        _ => false,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id() -> CanonicalId {
        CanonicalId::parse("76561197960287930").unwrap()
    }

    #[test]
    fn test_join_keys_match_between_holding_and_description() {
        let holding = RawHolding {
            class_key: "310776".to_string(),
            instance_key: "302028390".to_string(),
            amount: "1".to_string(),
            detail: HoldingDetail::Snapshot {
                asset_id: "1".to_string(),
            },
        };
        let description = ItemDescription {
            class_key: "310776".to_string(),
            instance_key: "302028390".to_string(),
            name: Some("AK-47".to_string()),
            market_hash_name: None,
            item_type: Some("Rifle".to_string()),
            tradable: true,
            marketable: true,
        };
        assert_eq!(holding.join_key(), description.join_key());
    }

    #[test]
    fn test_join_key_is_unambiguous() {
        assert_ne!(join_key("1", "23"), join_key("12", "3"));
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(&id(), StatusCode::FORBIDDEN),
            ExportError::Access { .. }
        ));
        assert!(matches!(
            classify_status(&id(), StatusCode::UNAUTHORIZED),
            ExportError::Access { .. }
        ));
        assert!(matches!(
            classify_status(&id(), StatusCode::NOT_FOUND),
            ExportError::NotFound { .. }
        ));
        assert!(matches!(
            classify_status(&id(), StatusCode::BAD_GATEWAY),
            ExportError::Upstream { .. }
        ));
        assert!(matches!(
            classify_status(&id(), StatusCode::TOO_MANY_REQUESTS),
            ExportError::Upstream { .. }
        ));
    }

    #[derive(Debug, Deserialize)]
    struct Flags {
        #[serde(default, deserialize_with = "de_flag")]
        flag: bool,
    }

    #[test]
    fn test_de_flag_variants() {
        for (json, expected) in [
            (serde_json::json!({"flag": 1}), true),
            (serde_json::json!({"flag": 0}), false),
            (serde_json::json!({"flag": true}), true),
            (serde_json::json!({"flag": "1"}), true),
            (serde_json::json!({"flag": "0"}), false),
            (serde_json::json!({"flag": null}), false),
            (serde_json::json!({}), false),
        ] {
            let parsed: Flags = serde_json::from_value(json.clone()).unwrap();
            assert_eq!(parsed.flag, expected, "{json}");
        }
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&serde_json::json!("42")).as_deref(), Some("42"));
        assert_eq!(scalar_text(&serde_json::json!(42)).as_deref(), Some("42"));
        assert_eq!(scalar_text(&serde_json::json!(null)), None);
        assert_eq!(scalar_text(&serde_json::json!([1])), None);
    }
}
