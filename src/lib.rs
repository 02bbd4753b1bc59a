//! CodeMap - fast structural code outliner
//!
//! This library scans a source tree, extracts a structural map of its code
//! entities with tree-sitter, and caches extraction results per file so
//! repeated scans only re-parse what actually changed.

pub mod cache;
pub mod cli;
pub mod extract;
pub mod outline;
pub mod scan;

/// Re-export commonly used types
pub use cache::{CacheEntry, CacheStore};
pub use extract::{Boundary, ChunkFilter, EntityChunk, EntityExtractor};
pub use scan::{CodeMap, ScanOutcome, ScanPipeline, ScanStats};

/// Application-wide error type
pub use anyhow::Result;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "codemap";
