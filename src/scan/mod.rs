//! Scan pipeline
//!
//! Turns a target root and a list of candidate files into a map of entity
//! chunks, reusing cached extractions wherever file content is unchanged.
//!
//! Files are processed in batches: every file in a batch is read and
//! fingerprinted concurrently (one task per file, so at most `batch_size`
//! file handles are open at once), then each result is checked against the
//! cache and extracted on a miss. Batches run strictly one after another.
//! The run is fail-fast: the first read, parse, or store error aborts it.

mod config;
mod discover;

pub use config::{ScanConfig, CONFIG_FILE};
pub use discover::FileDiscovery;

use crate::cache::{fingerprint, CacheStore};
use crate::extract::{ChunkFilter, EntityChunk, EntityExtractor};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default number of files read concurrently in one batch
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Map from root-relative file path to its extracted chunks
pub type CodeMap = BTreeMap<String, Vec<EntityChunk>>;

/// Result of one pipeline run
#[derive(Debug)]
pub struct ScanOutcome {
    /// Entities per file; files that yielded no entities are absent
    pub map: CodeMap,
    /// Cache effectiveness counters for the run
    pub stats: ScanStats,
}

/// Counters reported after a scan
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanStats {
    /// Files read during the run
    pub files_scanned: usize,
    /// Files whose cached chunks were reused
    pub cache_hits: usize,
    /// Files that required fresh extraction
    pub cache_misses: usize,
}

/// Batched, cache-aware analysis pipeline
pub struct ScanPipeline {
    store: CacheStore,
    extractor: EntityExtractor,
    filter: ChunkFilter,
    batch_size: usize,
}

impl ScanPipeline {
    /// Create a pipeline around an opened cache store
    pub fn new(store: CacheStore, filter: ChunkFilter) -> Result<Self> {
        Ok(Self {
            store,
            extractor: EntityExtractor::new()?,
            filter,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Override the per-batch concurrency bound
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// The cache store backing this pipeline
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Analyze the given files, keyed relative to `target_root`
    pub async fn run(&mut self, target_root: &Path, file_paths: &[PathBuf]) -> Result<ScanOutcome> {
        let mut map = CodeMap::new();
        let mut stats = ScanStats::default();

        for batch in file_paths.chunks(self.batch_size) {
            let mut tasks = Vec::with_capacity(batch.len());
            for path in batch {
                tasks.push(tokio::spawn(read_and_fingerprint(path.clone())));
            }

            for task in tasks {
                let (path, content, print) = task.await.context("File read task panicked")??;

                let chunks = match self.store.get(&path)? {
                    Some(entry) if entry.fingerprint == print => {
                        stats.cache_hits += 1;
                        tracing::debug!("Cache hit for {}", path.display());
                        entry.chunks
                    }
                    _ => {
                        stats.cache_misses += 1;
                        tracing::debug!("Extracting {}", path.display());
                        let chunks = self.extractor.extract(&path, &content, self.filter)?;
                        self.store.put(&path, &print, &chunks)?;
                        chunks
                    }
                };

                stats.files_scanned += 1;
                if chunks.is_empty() {
                    continue;
                }

                let rel = path
                    .strip_prefix(target_root)
                    .unwrap_or(&path)
                    .to_string_lossy()
                    .to_string();
                map.insert(rel, chunks);
            }
        }

        Ok(ScanOutcome { map, stats })
    }
}

/// Read a file and fingerprint its content
async fn read_and_fingerprint(path: PathBuf) -> Result<(PathBuf, String, String)> {
    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let print = fingerprint(&content);
    Ok((path, content, print))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_tree(dir: &Path, files: &[(&str, &str)]) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        for (name, content) in files {
            let path = dir.join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&path, content).unwrap();
            paths.push(path);
        }
        paths
    }

    fn pipeline() -> ScanPipeline {
        ScanPipeline::new(CacheStore::open_in_memory().unwrap(), ChunkFilter::default()).unwrap()
    }

    #[tokio::test]
    async fn test_first_run_extracts_everything() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_tree(
            dir.path(),
            &[
                ("a.rs", "pub fn alpha() {}\n"),
                ("b.rs", "pub fn beta() {}\n"),
            ],
        );

        let mut pipeline = pipeline();
        let outcome = pipeline.run(dir.path(), &files).await.unwrap();

        assert_eq!(outcome.stats.files_scanned, 2);
        assert_eq!(outcome.stats.cache_misses, 2);
        assert_eq!(outcome.stats.cache_hits, 0);
        assert_eq!(outcome.map.len(), 2);
        assert!(outcome.map.contains_key("a.rs"));
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent_and_all_hits() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_tree(
            dir.path(),
            &[
                ("a.rs", "pub fn alpha() {}\n"),
                ("b.py", "def beta():\n    pass\n"),
            ],
        );

        let mut pipeline = pipeline();
        let first = pipeline.run(dir.path(), &files).await.unwrap();
        let second = pipeline.run(dir.path(), &files).await.unwrap();

        assert_eq!(second.stats.cache_misses, 0);
        assert_eq!(second.stats.cache_hits, 2);
        assert_eq!(first.map, second.map);
    }

    #[tokio::test]
    async fn test_changed_and_new_files_reextracted() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = write_tree(
            dir.path(),
            &[
                ("a.rs", "pub fn alpha() {}\n"),
                ("b.rs", "pub fn beta() {}\n"),
            ],
        );

        let mut pipeline = pipeline();
        pipeline.run(dir.path(), &files).await.unwrap();

        // A unchanged, B modified, C new
        std::fs::write(dir.path().join("b.rs"), "pub fn beta_two() {}\n").unwrap();
        files.extend(write_tree(dir.path(), &[("c.rs", "pub fn gamma() {}\n")]));

        let outcome = pipeline.run(dir.path(), &files).await.unwrap();

        assert_eq!(outcome.stats.cache_hits, 1);
        assert_eq!(outcome.stats.cache_misses, 2);
        assert!(outcome.map["b.rs"][0].content.contains("beta_two"));
        assert!(outcome.map.contains_key("c.rs"));
    }

    #[tokio::test]
    async fn test_modified_file_updates_cache_entry() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_tree(dir.path(), &[("a.rs", "pub fn one() {}\n")]);

        let mut pipeline = pipeline();
        pipeline.run(dir.path(), &files).await.unwrap();
        let before = pipeline.store().get(&files[0]).unwrap().unwrap();

        std::fs::write(&files[0], "pub fn two() {}\n").unwrap();
        pipeline.run(dir.path(), &files).await.unwrap();
        let after = pipeline.store().get(&files[0]).unwrap().unwrap();

        assert_ne!(before.fingerprint, after.fingerprint);
        assert!(after.chunks[0].content.contains("two"));
    }

    #[tokio::test]
    async fn test_files_without_entities_are_omitted() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_tree(
            dir.path(),
            &[
                ("empty.rs", "// just a comment\n"),
                ("real.rs", "pub fn real() {}\n"),
            ],
        );

        let mut pipeline = pipeline();
        let outcome = pipeline.run(dir.path(), &files).await.unwrap();

        assert_eq!(outcome.stats.files_scanned, 2);
        assert_eq!(outcome.map.len(), 1);
        assert!(!outcome.map.contains_key("empty.rs"));
    }

    #[tokio::test]
    async fn test_small_batches_cover_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let specs: Vec<(String, String)> = (0..7)
            .map(|i| (format!("f{i}.rs"), format!("pub fn f{i}() {{}}\n")))
            .collect();
        let borrowed: Vec<(&str, &str)> = specs
            .iter()
            .map(|(n, c)| (n.as_str(), c.as_str()))
            .collect();
        let files = write_tree(dir.path(), &borrowed);

        let mut pipeline = pipeline().with_batch_size(2);
        let outcome = pipeline.run(dir.path(), &files).await.unwrap();

        assert_eq!(outcome.stats.files_scanned, 7);
        assert_eq!(outcome.map.len(), 7);
    }

    #[tokio::test]
    async fn test_unreadable_file_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = write_tree(dir.path(), &[("a.rs", "pub fn alpha() {}\n")]);
        files.push(dir.path().join("missing.rs"));

        let mut pipeline = pipeline();
        let result = pipeline.run(dir.path(), &files).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_filter_policy_flows_through() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_tree(dir.path(), &[("a.rs", "use std::fmt;\n")]);

        let mut excluding = pipeline();
        let outcome = excluding.run(dir.path(), &files).await.unwrap();
        assert!(outcome.map.is_empty());

        let mut including = ScanPipeline::new(
            CacheStore::open_in_memory().unwrap(),
            ChunkFilter::IncludeAll,
        )
        .unwrap();
        let outcome = including.run(dir.path(), &files).await.unwrap();
        assert_eq!(outcome.map["a.rs"].len(), 1);
    }
}
