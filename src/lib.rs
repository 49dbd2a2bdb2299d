//! Inventory Export Library
//!
//! This library turns a public Steam profile reference (a `/profiles/<id>` URL,
//! an `/id/<alias>` URL or a bare token) into a CSV export of that profile's
//! inventory for one configured game.
//!
//! # Architecture
//!
//! The pipeline runs once per request, leaves first:
//! - [`profile`] - Profile reference extraction and alias resolution
//! - [`inventory`] - Inventory retrieval from one of two backend variants
//! - [`join`] - Holding/description join into flat rows
//! - [`tabular`] - Always-quoted CSV encoding
//! - [`export`] - Pipeline entry point and response packaging
//! - [`config`] - Explicit pipeline configuration
//! - [`error`] - Failure taxonomy and status mapping

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod export;
pub(crate) mod http_client;
pub mod inventory;
pub mod join;
pub mod profile;
pub mod tabular;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use config::{BackendVariant, ExportConfig, MAX_PAGE_SIZE};
pub use error::ExportError;
pub use export::{ExportPipeline, ExportResponse, FailureBody, FileDownload, export_inventory};
pub use inventory::{
    CommunityInventorySource, EconomyItemsSource, HoldingDetail, InventoryContents,
    InventorySource, ItemDescription, RawHolding,
};
pub use join::{build_rows, join_holdings};
pub use profile::{
    AliasLookup, AliasLookupResult, CanonicalId, VanityUrlLookup, extract_profile_token,
    resolve_profile_id,
};
pub use tabular::{InventoryRow, encode_rows};
