//! CLI interface using clap
//!
//! Provides the command-line interface for CodeMap

mod commands;

pub use commands::*;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CodeMap - structural code outliner
#[derive(Parser, Debug)]
#[command(name = "codemap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Cache directory (defaults to the user cache directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a source tree and print its outline
    Scan(ScanArgs),

    /// Remove cached extractions, fully or scoped to a directory
    Clear(ClearArgs),

    /// Show cache statistics
    Stats(StatsArgs),
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Arguments for scan command
#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Root of the tree to scan (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Only show entities whose headline contains this pattern
    #[arg(short, long)]
    pub search: Option<String>,

    /// Number of files read concurrently per batch
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Include import/use declarations in the outline
    #[arg(long)]
    pub include_imports: bool,
}

/// Arguments for clear command
#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Only clear entries under this directory (full clear when omitted)
    pub path: Option<PathBuf>,
}

/// Arguments for stats command
#[derive(Parser, Debug)]
pub struct StatsArgs {}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
