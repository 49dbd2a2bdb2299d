//! Export pipeline entry point and response packaging.
//!
//! [`ExportPipeline::export`] runs extraction, resolution, fetch, join and
//! encoding once, sequentially, and packages the outcome as an
//! [`ExportResponse`]: a CSV file download on success, or a status code plus
//! a one-field JSON body on failure. Nothing is retried or cached.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{BackendVariant, ExportConfig};
use crate::error::ExportError;
use crate::http_client::build_http_client;
use crate::inventory::{CommunityInventorySource, EconomyItemsSource, InventorySource};
use crate::join::build_rows;
use crate::profile::{
    AliasLookup, CanonicalId, VanityUrlLookup, extract_profile_token, resolve_profile_id,
};
use crate::tabular::encode_rows;

/// Media type of a successful export.
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
/// Media type of a failure body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A successful export, framed as a file download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDownload {
    /// Canonical id the inventory belongs to.
    pub steam_id: CanonicalId,
    /// Suggested filename, `{prefix}_{steam_id}.csv`.
    pub filename: String,
    /// Encoded CSV document.
    pub body: String,
}

impl FileDownload {
    /// Packages `body` for `steam_id` with the variant's filename prefix.
    #[must_use]
    pub fn new(steam_id: CanonicalId, variant: BackendVariant, body: String) -> Self {
        let filename = format!("{}_{}.csv", variant.filename_prefix(), steam_id);
        Self {
            steam_id,
            filename,
            body,
        }
    }

    /// `Content-Disposition` value suggesting the download filename.
    #[must_use]
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

/// A failed export: status code plus one user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureBody {
    /// Transport status code.
    #[serde(skip)]
    pub status: u16,
    /// Human-readable message.
    pub error: String,
}

impl FailureBody {
    /// Maps an error to its status and fixed message.
    #[must_use]
    pub fn from_error(error: &ExportError) -> Self {
        Self {
            status: error.status_code(),
            error: error.user_message().to_string(),
        }
    }

    /// JSON body, `{"error": "<message>"}`.
    #[must_use]
    pub fn to_json(&self) -> String {
        // A struct of one string field always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Outcome of one export request, ready for any transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportResponse {
    /// CSV file download (status 200).
    File(FileDownload),
    /// Structured failure.
    Failure(FailureBody),
}

impl ExportResponse {
    /// Packages a pipeline result, logging failures.
    #[must_use]
    pub fn from_result(result: Result<FileDownload, ExportError>) -> Self {
        match result {
            Ok(file) => Self::File(file),
            Err(error) => {
                warn!(error = %error, status = error.status_code(), "Export failed");
                Self::Failure(FailureBody::from_error(&error))
            }
        }
    }

    /// Transport status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::File(_) => 200,
            Self::Failure(failure) => failure.status,
        }
    }

    /// True for a file download.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// Response headers as `(name, value)` pairs.
    #[must_use]
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::File(file) => vec![
                ("Content-Type", CSV_CONTENT_TYPE.to_string()),
                ("Content-Disposition", file.content_disposition()),
            ],
            Self::Failure(_) => vec![("Content-Type", JSON_CONTENT_TYPE.to_string())],
        }
    }

    /// Response body: the CSV document, or the JSON failure object.
    #[must_use]
    pub fn body(&self) -> String {
        match self {
            Self::File(file) => file.body.clone(),
            Self::Failure(failure) => failure.to_json(),
        }
    }
}

/// One configured export pipeline: an alias lookup and one inventory source.
pub struct ExportPipeline {
    lookup: Box<dyn AliasLookup>,
    source: Box<dyn InventorySource>,
}

impl ExportPipeline {
    /// Builds the pipeline for `config`'s backend over one shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Configuration`] when `config` fails validation
    /// or the HTTP client cannot be built.
    pub fn new(config: &ExportConfig) -> Result<Self, ExportError> {
        config.validate()?;
        let client = build_http_client(config)?;

        let lookup = VanityUrlLookup::new(client.clone(), config)?;
        let source: Box<dyn InventorySource> = match config.backend {
            BackendVariant::Snapshot => Box::new(CommunityInventorySource::new(client, config)),
            BackendVariant::Legacy => Box::new(EconomyItemsSource::new(client, config)?),
        };

        Ok(Self::with_parts(Box::new(lookup), source))
    }

    /// Builds a pipeline from explicit collaborators.
    #[must_use]
    pub fn with_parts(lookup: Box<dyn AliasLookup>, source: Box<dyn InventorySource>) -> Self {
        Self { lookup, source }
    }

    /// Active backend variant.
    #[must_use]
    pub fn variant(&self) -> BackendVariant {
        self.source.variant()
    }

    /// Runs the pipeline for `reference`, returning the file or the first failure.
    ///
    /// # Errors
    ///
    /// Returns the [`ExportError`] of whichever stage failed first.
    #[tracing::instrument(skip(self), fields(backend = %self.variant()))]
    pub async fn run(&self, reference: Option<&str>) -> Result<FileDownload, ExportError> {
        let reference = reference.map(str::trim).unwrap_or_default();
        if reference.is_empty() {
            return Err(ExportError::validation(reference, "no profile reference given"));
        }

        let token = extract_profile_token(reference).ok_or_else(|| {
            ExportError::validation(reference, "no profile identifier found in reference")
        })?;

        let steam_id = resolve_profile_id(&token, self.lookup.as_ref()).await?;
        let contents = self.source.fetch(&steam_id).await?;
        let rows = build_rows(&contents);
        let body = encode_rows(&rows)?;

        info!(
            steam_id = %steam_id,
            rows = rows.len(),
            bytes = body.len(),
            "Inventory exported"
        );
        Ok(FileDownload::new(steam_id, self.variant(), body))
    }

    /// Runs the pipeline and packages the outcome; never fails.
    pub async fn export(&self, reference: Option<&str>) -> ExportResponse {
        ExportResponse::from_result(self.run(reference).await)
    }
}

impl std::fmt::Debug for ExportPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportPipeline")
            .field("variant", &self.variant())
            .finish_non_exhaustive()
    }
}

/// Builds a pipeline from `config` and exports `reference` with it.
///
/// Configuration failures are packaged like any other failure (status 500).
pub async fn export_inventory(config: &ExportConfig, reference: Option<&str>) -> ExportResponse {
    match ExportPipeline::new(config) {
        Ok(pipeline) => pipeline.export(reference).await,
        Err(error) => ExportResponse::from_result(Err(error)),
    }
}
