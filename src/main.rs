//! CodeMap - structural code outliner
//!
//! Scans a source tree, extracts a map of its code entities, and prints a
//! condensed outline. Extraction results are cached per file, so rescans
//! of an unchanged tree skip parsing entirely.

use anyhow::Result;
use codemap::cli::{clear, scan, stats, Cli, Commands};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let cache_dir = cli.cache_dir.as_deref();

    // Execute command
    match cli.command {
        Commands::Scan(args) => {
            scan(&args, cache_dir, cli.format).await?;
        }

        Commands::Clear(args) => {
            clear(&args, cache_dir)?;
        }

        Commands::Stats(_args) => {
            stats(cache_dir)?;
        }
    }

    Ok(())
}
