//! CLI entry point for the inventory exporter.

use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use inventory_export::{ExportResponse, export_inventory};
use tracing::{debug, info};

mod app_config;
mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let file_config = app_config::load_file_config(args.config.as_deref())?;
    let config = app_config::build_export_config(
        &args,
        file_config.as_ref(),
        app_config::api_key_from_env(),
    );
    debug!(?config, "Export configuration resolved");

    let response = export_inventory(&config, Some(args.reference.as_str())).await;
    match &response {
        ExportResponse::File(file) => {
            if args.stdout {
                let mut stdout = io::stdout().lock();
                stdout.write_all(file.body.as_bytes())?;
                stdout.flush()?;
            } else {
                let output_dir = app_config::resolve_output_dir(&args, file_config.as_ref());
                fs::create_dir_all(&output_dir).with_context(|| {
                    format!("Failed to create output directory '{}'", output_dir.display())
                })?;
                let path = output_dir.join(&file.filename);
                fs::write(&path, &file.body)
                    .with_context(|| format!("Failed to write '{}'", path.display()))?;
                info!(path = %path.display(), "Export written");
            }
            Ok(ExitCode::SUCCESS)
        }
        ExportResponse::Failure(failure) => {
            eprintln!("Error: {}", failure.error);
            Ok(exit_code_for_status(response.status()))
        }
    }
}

/// Client-side failures exit 2, everything else 1.
fn exit_code_for_status(status: u16) -> ExitCode {
    if (400..500).contains(&status) {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}
