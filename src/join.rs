//! Holding/description join.
//!
//! Snapshot holdings are joined with their descriptions on the composite
//! classification key; holdings with no match still produce a row with
//! explicit defaults. Legacy holdings have no description set and are
//! flattened directly.

use std::collections::HashMap;

use tracing::debug;

use crate::inventory::{HoldingDetail, InventoryContents, ItemDescription, RawHolding};
use crate::tabular::InventoryRow;

/// Name/type placeholder for holdings without description.
pub const UNKNOWN: &str = "Unknown";
/// Flag text for `false` and for holdings without description.
pub const NO: &str = "No";
/// Flag text for `true`.
pub const YES: &str = "Yes";

/// Column order of snapshot rows.
pub const SNAPSHOT_COLUMNS: [&str; 9] = [
    "Asset ID",
    "Class ID",
    "Instance ID",
    "Amount",
    "Name",
    "Market Hash Name",
    "Type",
    "Tradable",
    "Marketable",
];

/// Column order of legacy rows.
pub const LEGACY_COLUMNS: [&str; 7] = [
    "Item ID",
    "Original ID",
    "Definition Index",
    "Quality",
    "Level",
    "Quantity",
    "Origin",
];

/// Turns fetched contents into rows, joining when descriptions are present.
#[must_use]
pub fn build_rows(contents: &InventoryContents) -> Vec<InventoryRow> {
    match &contents.descriptions {
        Some(descriptions) => join_holdings(&contents.holdings, descriptions),
        None => contents.holdings.iter().map(legacy_row).collect(),
    }
}

/// Joins each holding with the description sharing its classification pair.
///
/// Output order is input holding order. When several descriptions share a
/// key, the first one wins.
#[must_use]
pub fn join_holdings(
    holdings: &[RawHolding],
    descriptions: &[ItemDescription],
) -> Vec<InventoryRow> {
    let mut by_key: HashMap<String, &ItemDescription> = HashMap::with_capacity(descriptions.len());
    for description in descriptions {
        by_key.entry(description.join_key()).or_insert(description);
    }

    let mut unmatched = 0_usize;
    let rows: Vec<InventoryRow> = holdings
        .iter()
        .map(|holding| {
            let description = by_key.get(&holding.join_key()).copied();
            if description.is_none() {
                unmatched += 1;
            }
            snapshot_row(holding, description)
        })
        .collect();

    debug!(
        holdings = holdings.len(),
        descriptions = descriptions.len(),
        unmatched,
        "Joined holdings with descriptions"
    );
    rows
}

fn flag(value: bool) -> &'static str {
    if value { YES } else { NO }
}

fn snapshot_row(holding: &RawHolding, description: Option<&ItemDescription>) -> InventoryRow {
    let asset_id = match &holding.detail {
        HoldingDetail::Snapshot { asset_id } => Some(asset_id.clone()),
        HoldingDetail::Legacy { item_id, .. } => Some(item_id.clone()),
    };

    let [asset, class, instance, amount, name, hash_name, item_type, tradable, marketable] =
        SNAPSHOT_COLUMNS;
    let row = InventoryRow::new()
        .optional_field(asset, asset_id)
        .field(class, holding.class_key.as_str())
        .field(instance, holding.instance_key.as_str())
        .field(amount, holding.amount.as_str());

    match description {
        Some(description) => row
            .field(name, description.name.as_deref().unwrap_or(UNKNOWN))
            .optional_field(hash_name, description.market_hash_name.clone())
            .field(item_type, description.item_type.as_deref().unwrap_or(UNKNOWN))
            .field(tradable, flag(description.tradable))
            .field(marketable, flag(description.marketable)),
        None => row
            .field(name, UNKNOWN)
            .field(hash_name, UNKNOWN)
            .field(item_type, UNKNOWN)
            .field(tradable, NO)
            .field(marketable, NO),
    }
}

fn legacy_row(holding: &RawHolding) -> InventoryRow {
    let (item_id, original_id, level, origin) = match &holding.detail {
        HoldingDetail::Legacy {
            item_id,
            original_id,
            level,
            origin,
        } => (
            Some(item_id.clone()),
            original_id.clone(),
            level.clone(),
            origin.clone(),
        ),
        HoldingDetail::Snapshot { asset_id } => (Some(asset_id.clone()), None, None, None),
    };

    let [item, original, defindex, quality, level_col, quantity, origin_col] = LEGACY_COLUMNS;
    InventoryRow::new()
        .optional_field(item, item_id)
        .optional_field(original, original_id)
        .field(defindex, holding.class_key.as_str())
        .field(quality, holding.instance_key.as_str())
        .optional_field(level_col, level)
        .field(quantity, holding.amount.as_str())
        .optional_field(origin_col, origin)
}
