//! Configuration loading for the CLI.
//!
//! Precedence, highest first: command-line flags, `STEAM_API_KEY` (API key
//! only), the config file, built-in defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use inventory_export::{BackendVariant, ExportConfig, MAX_PAGE_SIZE};

use crate::cli::Args;

/// Environment variable holding the Steam Web API key.
pub const API_KEY_ENV: &str = "STEAM_API_KEY";

/// TOML-style file configuration (`key = value` lines).
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    /// Steam Web API key.
    pub api_key: Option<String>,
    /// Inventory backend (`snapshot` or `legacy`).
    pub backend: Option<BackendVariant>,
    /// Game catalog id.
    pub app_id: Option<u32>,
    /// Inventory context id.
    pub context_id: Option<u32>,
    /// Snapshot item count cap.
    pub page_size: Option<u32>,
    /// Default directory for exported files.
    pub output_dir: Option<PathBuf>,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// HTTP request timeout in seconds.
    pub read_timeout_secs: Option<u64>,
    /// Community site base URL override.
    pub community_base_url: Option<String>,
    /// Web API base URL override.
    pub api_base_url: Option<String>,
}

impl FileConfig {
    /// Validates values against runtime constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(page_size) = self.page_size
            && !(1..=MAX_PAGE_SIZE).contains(&page_size)
        {
            bail!(
                "Invalid config value for `page_size`: {page_size}. Expected range: 1..={MAX_PAGE_SIZE}"
            );
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=600");
    }
    Ok(())
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/inventory-export/config.toml`
/// 2. `$HOME/.config/inventory-export/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("inventory-export")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("inventory-export")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads `explicit` if given (must exist), else the default path if present.
pub fn load_file_config(explicit: Option<&Path>) -> Result<Option<FileConfig>> {
    if let Some(path) = explicit {
        return read_file_config(path).map(Some);
    }

    match resolve_default_config_path() {
        Some(path) if path.exists() => read_file_config(&path).map(Some),
        _ => Ok(None),
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

/// Reads the API key from the environment, ignoring blank values.
#[must_use]
pub fn api_key_from_env() -> Option<String> {
    env::var(API_KEY_ENV)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Merges flags, environment key and file config into an [`ExportConfig`].
#[must_use]
pub fn build_export_config(
    args: &Args,
    file_config: Option<&FileConfig>,
    env_api_key: Option<String>,
) -> ExportConfig {
    let file = file_config.cloned().unwrap_or_default();
    let mut config = ExportConfig::new(env_api_key.or(file.api_key));

    if let Some(backend) = args.backend.or(file.backend) {
        config.backend = backend;
    }
    if let Some(app_id) = args.app_id.or(file.app_id) {
        config.app_id = app_id;
    }
    if let Some(context_id) = args.context_id.or(file.context_id) {
        config.context_id = context_id;
    }
    if let Some(page_size) = file.page_size {
        config.page_size = page_size;
    }
    if let Some(secs) = file.connect_timeout_secs {
        config.connect_timeout_secs = secs;
    }
    if let Some(secs) = file.read_timeout_secs {
        config.read_timeout_secs = secs;
    }
    if let Some(url) = file.community_base_url {
        config.community_base_url = url;
    }
    if let Some(url) = file.api_base_url {
        config.api_base_url = url;
    }
    config
}

/// Output directory: flag, then file config, then the current directory.
#[must_use]
pub fn resolve_output_dir(args: &Args, file_config: Option<&FileConfig>) -> PathBuf {
    args.output_dir
        .clone()
        .or_else(|| file_config.and_then(|cfg| cfg.output_dir.clone()))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!(
                "Invalid config syntax on line {}: expected key = value",
                line_index + 1
            );
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let line_no = line_index + 1;

        match key {
            "api_key" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `api_key` value on line {line_no}"))?;
                cfg.api_key = Some(parsed).filter(|key| !key.trim().is_empty());
            }
            "backend" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `backend` value on line {line_no}"))?;
                let backend = parsed
                    .parse::<BackendVariant>()
                    .map_err(anyhow::Error::msg)
                    .with_context(|| format!("Invalid `backend` value on line {line_no}"))?;
                cfg.backend = Some(backend);
            }
            "app_id" => {
                cfg.app_id = Some(
                    parse_integer_u32(value)
                        .with_context(|| format!("Invalid `app_id` value on line {line_no}"))?,
                );
            }
            "context_id" => {
                cfg.context_id = Some(
                    parse_integer_u32(value)
                        .with_context(|| format!("Invalid `context_id` value on line {line_no}"))?,
                );
            }
            "page_size" => {
                cfg.page_size = Some(
                    parse_integer_u32(value)
                        .with_context(|| format!("Invalid `page_size` value on line {line_no}"))?,
                );
            }
            "output_dir" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `output_dir` value on line {line_no}"))?;
                cfg.output_dir = Some(PathBuf::from(parsed));
            }
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(parse_integer_u64(value).with_context(|| {
                    format!("Invalid `connect_timeout_secs` value on line {line_no}")
                })?);
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs = Some(parse_integer_u64(value).with_context(|| {
                    format!("Invalid `read_timeout_secs` value on line {line_no}")
                })?);
            }
            "community_base_url" => {
                cfg.community_base_url = Some(parse_base_url(value).with_context(|| {
                    format!("Invalid `community_base_url` value on line {line_no}")
                })?);
            }
            "api_base_url" => {
                cfg.api_base_url = Some(parse_base_url(value).with_context(|| {
                    format!("Invalid `api_base_url` value on line {line_no}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_base_url(raw_value: &str) -> Result<String> {
    let parsed = parse_string_literal(raw_value)?;
    let url = url::Url::parse(&parsed)?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Expected http or https URL");
    }
    Ok(parsed)
}

fn parse_integer_u32(raw_value: &str) -> Result<u32> {
    let value = parse_integer_u64(raw_value)?;
    u32::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u32"))
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["inventory-export"];
        argv.extend_from_slice(extra);
        argv.push("myalias");
        Args::try_parse_from(argv).expect("args should parse")
    }

    #[test]
    fn test_parse_config_all_fields() {
        let cfg = parse_config_str(
            r#"
api_key = "ABC123"
backend = "legacy"
app_id = 440
context_id = 2
page_size = 2500
output_dir = "/tmp/exports"
connect_timeout_secs = 5
read_timeout_secs = 20
"#,
        )
        .expect("full config should parse");
        assert_eq!(cfg.api_key.as_deref(), Some("ABC123"));
        assert_eq!(cfg.backend, Some(BackendVariant::Legacy));
        assert_eq!(cfg.app_id, Some(440));
        assert_eq!(cfg.context_id, Some(2));
        assert_eq!(cfg.page_size, Some(2500));
        assert_eq!(cfg.output_dir, Some(PathBuf::from("/tmp/exports")));
        assert_eq!(cfg.connect_timeout_secs, Some(5));
        assert_eq!(cfg.read_timeout_secs, Some(20));
    }

    #[test]
    fn test_parse_config_supports_inline_comments() {
        let cfg = parse_config_str(
            r##"
app_id = 730 # counter-strike
api_key = "has#hash" # quoted hash is kept
"##,
        )
        .expect("config with comments should parse");
        assert_eq!(cfg.app_id, Some(730));
        assert_eq!(cfg.api_key.as_deref(), Some("has#hash"));
    }

    #[test]
    fn test_parse_config_rejects_page_size_over_cap() {
        let err = parse_config_str("page_size = 5001").expect_err("page_size over cap");
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_backend() {
        let err = parse_config_str(r#"backend = "both""#).expect_err("unknown backend");
        assert!(err.to_string().contains("backend"));
    }

    #[test]
    fn test_parse_config_rejects_unquoted_string() {
        let err = parse_config_str("api_key = ABC").expect_err("unquoted key");
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_timeout() {
        let err = parse_config_str("read_timeout_secs = 0").expect_err("zero timeout");
        assert!(err.to_string().contains("read_timeout_secs"));
    }

    #[test]
    fn test_parse_config_base_url_overrides() {
        let cfg = parse_config_str(
            r#"
community_base_url = "http://127.0.0.1:8080"
api_base_url = "https://api.example.test/"
"#,
        )
        .expect("base urls should parse");
        assert_eq!(cfg.community_base_url.as_deref(), Some("http://127.0.0.1:8080"));

        let config = build_export_config(&args(&[]), Some(&cfg), None);
        assert_eq!(config.api_base_url, "https://api.example.test/");

        let err = parse_config_str(r#"api_base_url = "ftp://example.test""#)
            .expect_err("non-http scheme");
        assert!(err.to_string().contains("api_base_url"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        let err = parse_config_str("rate_limit = 1").expect_err("unknown key error expected");
        assert!(err.to_string().contains("Unknown configuration key"));
        assert!(err.to_string().contains("rate_limit"));
    }

    #[test]
    fn test_parse_config_rejects_missing_equals() {
        let err = parse_config_str("app_id 730").expect_err("syntax error expected");
        assert!(err.to_string().contains("expected key = value"));
    }

    #[test]
    fn test_blank_api_key_in_file_is_absent() {
        let cfg = parse_config_str(r#"api_key = "  ""#).expect("blank key parses");
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn test_load_explicit_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "app_id = 570\n").expect("write config");

        let cfg = load_file_config(Some(&path)).expect("load").expect("config present");
        assert_eq!(cfg.app_id, Some(570));
    }

    #[test]
    fn test_load_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_file_config(Some(&dir.path().join("absent.toml"))).expect_err("missing");
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_build_export_config_precedence() {
        let file = FileConfig {
            api_key: Some("FILEKEY".to_string()),
            backend: Some(BackendVariant::Legacy),
            app_id: Some(440),
            page_size: Some(100),
            ..FileConfig::default()
        };

        let from_file = build_export_config(&args(&[]), Some(&file), None);
        assert_eq!(from_file.api_key.as_deref(), Some("FILEKEY"));
        assert_eq!(from_file.backend, BackendVariant::Legacy);
        assert_eq!(from_file.app_id, 440);
        assert_eq!(from_file.page_size, 100);

        let overridden = build_export_config(
            &args(&["--backend", "snapshot", "--app-id", "730"]),
            Some(&file),
            Some("ENVKEY".to_string()),
        );
        assert_eq!(overridden.api_key.as_deref(), Some("ENVKEY"));
        assert_eq!(overridden.backend, BackendVariant::Snapshot);
        assert_eq!(overridden.app_id, 730);
    }

    #[test]
    fn test_build_export_config_defaults_without_file() {
        let config = build_export_config(&args(&[]), None, None);
        assert!(config.api_key.is_none());
        assert_eq!(config.backend, BackendVariant::Snapshot);
        assert_eq!(config.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_resolve_output_dir_precedence() {
        let file = FileConfig {
            output_dir: Some(PathBuf::from("/from/file")),
            ..FileConfig::default()
        };
        assert_eq!(resolve_output_dir(&args(&[]), None), PathBuf::from("."));
        assert_eq!(
            resolve_output_dir(&args(&[]), Some(&file)),
            PathBuf::from("/from/file")
        );
        assert_eq!(
            resolve_output_dir(&args(&["-o", "/from/flag"]), Some(&file)),
            PathBuf::from("/from/flag")
        );
    }
}
