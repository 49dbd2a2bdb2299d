//! Shared User-Agent string for outbound API requests.

/// Project URL for User-Agent identification (RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/inventory-export";

/// Default User-Agent for alias lookups and inventory requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("inventory-export/{version} (+{PROJECT_UA_URL})")
}
