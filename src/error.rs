//! Error types for the export pipeline.
//!
//! Every failure is terminal for the request. Each variant carries internal
//! detail for logs (its `Display` output) and maps to a fixed user-facing
//! message plus a transport status code.

use thiserror::Error;

/// Errors that can occur anywhere in the export pipeline.
#[derive(Debug, Clone, Error)]
pub enum ExportError {
    /// Required configuration is absent or out of range.
    #[error("configuration error: {reason}")]
    Configuration {
        /// What is misconfigured.
        reason: String,
    },

    /// The profile reference is missing or has no usable identifier.
    #[error("invalid profile reference '{input}': {reason}")]
    Validation {
        /// The reference as received (may be empty).
        input: String,
        /// Why no identifier could be extracted.
        reason: String,
    },

    /// The alias has no canonical mapping.
    #[error("alias '{alias}' could not be resolved (success flag {success})")]
    Resolution {
        /// The alias that was looked up.
        alias: String,
        /// Success flag reported by the lookup service.
        success: i64,
    },

    /// The inventory is private or the profile is otherwise restricted.
    #[error("inventory for {steam_id} is inaccessible: {reason}")]
    Access {
        /// Canonical id whose inventory was requested.
        steam_id: String,
        /// Upstream condition (HTTP status or result status).
        reason: String,
    },

    /// The profile or its inventory does not exist.
    #[error("inventory for {steam_id} not found: {reason}")]
    NotFound {
        /// Canonical id whose inventory was requested.
        steam_id: String,
        /// Upstream condition.
        reason: String,
    },

    /// The inventory exists but holds zero items.
    #[error("inventory for {steam_id} is empty")]
    EmptyInventory {
        /// Canonical id whose inventory was requested.
        steam_id: String,
    },

    /// The legacy backend answered HTTP 410 Gone.
    #[error("inventory endpoint {endpoint} answered HTTP 410 Gone")]
    PermanentlyGone {
        /// Endpoint that is no longer served to this key.
        endpoint: String,
    },

    /// Network failure, malformed upstream body, or unclassified upstream status.
    #[error("upstream failure calling {service}: {reason}")]
    Upstream {
        /// Which external service failed ("alias lookup", "inventory").
        service: String,
        /// Failure detail.
        reason: String,
    },

    /// The tabular writer failed.
    #[error("failed to encode inventory rows: {reason}")]
    Encoding {
        /// Writer failure detail.
        reason: String,
    },
}

impl ExportError {
    /// Creates a `Configuration` error.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Creates a `Validation` error.
    #[must_use]
    pub fn validation(input: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a `Resolution` error.
    #[must_use]
    pub fn resolution(alias: &str, success: i64) -> Self {
        Self::Resolution {
            alias: alias.to_string(),
            success,
        }
    }

    /// Creates an `Access` error.
    #[must_use]
    pub fn access(steam_id: &str, reason: impl Into<String>) -> Self {
        Self::Access {
            steam_id: steam_id.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a `NotFound` error.
    #[must_use]
    pub fn not_found(steam_id: &str, reason: impl Into<String>) -> Self {
        Self::NotFound {
            steam_id: steam_id.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates an `EmptyInventory` error.
    #[must_use]
    pub fn empty_inventory(steam_id: &str) -> Self {
        Self::EmptyInventory {
            steam_id: steam_id.to_string(),
        }
    }

    /// Creates a `PermanentlyGone` error.
    #[must_use]
    pub fn permanently_gone(endpoint: impl Into<String>) -> Self {
        Self::PermanentlyGone {
            endpoint: endpoint.into(),
        }
    }

    /// Creates an `Upstream` error.
    #[must_use]
    pub fn upstream(service: &str, reason: impl Into<String>) -> Self {
        Self::Upstream {
            service: service.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates an `Encoding` error.
    #[must_use]
    pub fn encoding(reason: impl Into<String>) -> Self {
        Self::Encoding {
            reason: reason.into(),
        }
    }

    /// Transport status code for this failure.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::Access { .. } => 403,
            Self::Resolution { .. } | Self::NotFound { .. } | Self::EmptyInventory { .. } => 404,
            Self::Configuration { .. }
            | Self::PermanentlyGone { .. }
            | Self::Upstream { .. }
            | Self::Encoding { .. } => 500,
        }
    }

    /// Fixed human-readable message returned to the caller.
    ///
    /// Never includes upstream detail; use `Display` for logs.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "Server is missing its inventory backend configuration.",
            Self::Validation { .. } => {
                "Please provide a valid Steam profile URL, custom URL alias, or 17-digit SteamID."
            }
            Self::Resolution { .. } => "Could not find a Steam profile for that custom URL.",
            Self::Access { .. } => {
                "This inventory is private or the profile is invalid. Make sure the profile and inventory are public."
            }
            Self::NotFound { .. } => "No inventory was found for this profile.",
            Self::EmptyInventory { .. } => "This inventory is empty.",
            Self::PermanentlyGone { .. } => {
                "The inventory service no longer grants access to this endpoint. The server's API access needs attention."
            }
            Self::Upstream { .. } => "Failed to retrieve the inventory from Steam. Try again later.",
            Self::Encoding { .. } => "Failed to build the inventory export.",
        }
    }
}
