//! Shared HTTP client construction for alias lookups and inventory sources.
//!
//! Both external calls use the same timeout, user-agent and compression
//! policy. Deadlines belong to the client; the pipeline adds none of its own.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::user_agent;

/// Builds the HTTP client used for every call made by one pipeline.
///
/// # Errors
///
/// Returns [`ExportError::Configuration`] when the client cannot be built.
pub(crate) fn build_http_client(config: &ExportConfig) -> Result<Client, ExportError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.read_timeout_secs))
        .user_agent(user_agent::default_user_agent())
        .gzip(true)
        .build()
        .map_err(|e| ExportError::configuration(format!("HTTP client construction failed: {e}")))
}

/// Joins `path` onto `base_url` and appends query pairs.
///
/// # Errors
///
/// Returns [`ExportError::Configuration`] when `base_url` is not a valid URL.
pub(crate) fn build_url(
    base_url: &str,
    path: &str,
    query: &[(&str, &str)],
) -> Result<Url, ExportError> {
    let joined = format!("{}{}", base_url.trim_end_matches('/'), path);
    let mut url = Url::parse(&joined)
        .map_err(|e| ExportError::configuration(format!("invalid base URL '{base_url}': {e}")))?;
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}

/// Renders a URL for logs with the `key` query parameter masked.
pub(crate) fn redacted(url: &Url) -> String {
    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = if k == "key" {
                "<redacted>".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), value)
        })
        .collect();
    if !pairs.is_empty() {
        masked.query_pairs_mut().clear().extend_pairs(pairs);
    }
    masked.to_string()
}
