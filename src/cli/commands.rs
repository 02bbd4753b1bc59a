//! Command implementations

use super::{ClearArgs, OutputFormat, ScanArgs};
use crate::cache::{default_cache_dir, CacheStore};
use crate::extract::ChunkFilter;
use crate::outline;
use crate::scan::{FileDiscovery, ScanConfig, ScanOutcome, ScanPipeline};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Scan a source tree and print its outline
pub async fn scan(args: &ScanArgs, cache_dir: Option<&Path>, format: OutputFormat) -> Result<()> {
    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("Target directory not found: {:?}", args.path))?;
    if !root.is_dir() {
        anyhow::bail!("Target is not a directory: {:?}", root);
    }

    let config = ScanConfig::load_or_default(&root)?;
    let batch_size = args.batch_size.unwrap_or(config.batch_size);
    let filter = if args.include_imports || config.include_imports {
        ChunkFilter::IncludeAll
    } else {
        ChunkFilter::ExcludeImports
    };

    let store = open_store(cache_dir)?;
    let files = FileDiscovery::new(&root)
        .with_extra_ignores(&config.ignore_dirs)
        .discover();

    if format == OutputFormat::Text {
        println!("Scanning {:?} ({} files)...\n", root, files.len());
    }

    let mut pipeline = ScanPipeline::new(store, filter)?.with_batch_size(batch_size);
    let outcome = pipeline.run(&root, &files).await?;

    match format {
        OutputFormat::Json => outline::print_json(&outcome.map)?,
        OutputFormat::Text => {
            outline::print_text(&outcome.map, args.search.as_deref());
            print_scan_summary(&outcome);
        }
    }

    Ok(())
}

/// Clear the cache, optionally scoped to a directory subtree
pub fn clear(args: &ClearArgs, cache_dir: Option<&Path>) -> Result<()> {
    let store = open_store(cache_dir)?;

    let removed = match &args.path {
        Some(path) => store.clear_subtree(&absolutize(path)?)?,
        None => store.clear_all()?,
    };

    println!("✓ Removed {} cache entries", removed);
    Ok(())
}

/// Show cache statistics
pub fn stats(cache_dir: Option<&Path>) -> Result<()> {
    let store = open_store(cache_dir)?;

    let location = match cache_dir {
        Some(dir) => dir.to_path_buf(),
        None => default_cache_dir()?,
    };

    println!("Cache directory: {:?}", location);
    println!("Cache entries: {}", store.len()?);
    Ok(())
}

fn open_store(cache_dir: Option<&Path>) -> Result<CacheStore> {
    match cache_dir {
        Some(dir) => CacheStore::open(dir),
        None => CacheStore::open_default(),
    }
}

/// Resolve a clear scope to an absolute path
///
/// The directory may no longer exist (clearing entries of a deleted tree
/// is a supported case), so canonicalization is best-effort.
fn absolutize(path: &Path) -> Result<PathBuf> {
    if let Ok(canonical) = path.canonicalize() {
        return Ok(canonical);
    }

    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
        Ok(cwd.join(path))
    }
}

fn print_scan_summary(outcome: &ScanOutcome) {
    let entities: usize = outcome.map.values().map(Vec::len).sum();

    println!("✓ Scan complete");
    println!("  Files scanned: {}", outcome.stats.files_scanned);
    println!("  Entities: {}", entities);
    println!("  Cache hits: {}", outcome.stats.cache_hits);
    println!("  Cache misses: {}", outcome.stats.cache_misses);
}
