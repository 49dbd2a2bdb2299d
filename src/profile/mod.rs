//! Profile reference parsing and identifier resolution.
//!
//! - [`extract_profile_token`] - Pulls the identifier candidate out of a URL or bare token
//! - [`CanonicalId`] - Validated 17-digit account identifier
//! - [`resolve_profile_id`] - Turns a candidate into a [`CanonicalId`], looking up aliases
//!
//! # Example
//!
//! ```
//! use inventory_export::profile::{CanonicalId, extract_profile_token};
//!
//! let token = extract_profile_token("https://steamcommunity.com/profiles/76561197960287930/");
//! assert_eq!(token.as_deref(), Some("76561197960287930"));
//! assert!(CanonicalId::parse("76561197960287930").is_some());
//! ```

mod resolver;

pub use resolver::{AliasLookup, AliasLookupResult, VanityUrlLookup, resolve_profile_id};

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

/// Path segments that announce the identifier in the next segment.
const ID_MARKERS: [&str; 2] = ["profiles", "id"];

#[allow(clippy::expect_used)]
static CANONICAL_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{17}$").expect("canonical id regex is valid") // Static pattern, safe to panic
});

/// A 17-digit account identifier, the only form the inventory backends accept.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalId(String);

impl CanonicalId {
    /// Parses `value` as a canonical id; `None` unless it is exactly 17 ASCII digits.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        CANONICAL_ID_PATTERN
            .is_match(value)
            .then(|| Self(value.to_string()))
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extracts the identifier candidate from a free-form profile reference.
///
/// Accepts full URLs (`https://steamcommunity.com/id/alias/`), scheme-less
/// paths (`steamcommunity.com/profiles/7656...`) and bare tokens alike; all go
/// through the same segment scan. The query string and fragment are dropped
/// first. When a `profiles` or `id` segment is present, the segment after the
/// last one wins; otherwise the final non-empty segment is returned.
///
/// Returns `None` for empty input or a trailing marker with nothing after it.
#[must_use]
pub fn extract_profile_token(reference: &str) -> Option<String> {
    let trimmed = reference.trim();
    let without_suffix = trimmed
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let path = without_suffix
        .strip_suffix('/')
        .unwrap_or(without_suffix);

    let segments: Vec<&str> = path.split('/').collect();

    let token = match segments.iter().rposition(|s| ID_MARKERS.contains(s)) {
        Some(marker_index) => segments
            .get(marker_index + 1)
            .copied()
            .filter(|s| !s.is_empty()),
        None => segments.iter().rev().copied().find(|s| !s.is_empty()),
    };

    trace!(reference = %trimmed, token = ?token, "extracted profile token");
    token.map(ToString::to_string)
}
