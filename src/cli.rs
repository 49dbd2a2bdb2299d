//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;
use inventory_export::BackendVariant;

/// Export a Steam inventory as CSV.
///
/// Accepts a profile URL (`/profiles/<id>` or `/id/<alias>`) or a bare id or
/// alias, and writes the inventory of one game as an always-quoted CSV file.
#[derive(Parser, Debug)]
#[command(name = "inventory-export")]
#[command(author, version, about)]
pub struct Args {
    /// Profile URL, 17-digit id or vanity alias
    pub reference: String,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Inventory backend: `snapshot` (community inventory) or `legacy` (economy items API)
    #[arg(short = 'b', long)]
    pub backend: Option<BackendVariant>,

    /// Game catalog id (default 730)
    #[arg(long)]
    pub app_id: Option<u32>,

    /// Inventory context id (default 2)
    #[arg(long)]
    pub context_id: Option<u32>,

    /// Directory to write the CSV file into (default: current directory)
    #[arg(short = 'o', long, conflicts_with = "stdout")]
    pub output_dir: Option<PathBuf>,

    /// Write the CSV document to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,

    /// Config file path (default: $XDG_CONFIG_HOME/inventory-export/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}
