//! Candidate file discovery
//!
//! Walks the target tree with gitignore semantics and hands the pipeline a
//! sorted list of absolute paths. Version-control, dependency, and
//! build-output directories are excluded unconditionally; everything else
//! follows `.gitignore` rules and the configured extra exclusions.

use crate::extract::Language;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Files above this size are skipped; generated blobs drown the outline
const MAX_FILE_SIZE_BYTES: u64 = 2 * 1024 * 1024;

/// Directory names never scanned, regardless of ignore files
const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "vendor",
    ".venv",
    "venv",
    "target",
    "build",
    "dist",
    "out",
    "__pycache__",
];

/// Scanner for finding source files under a root
pub struct FileDiscovery {
    root: PathBuf,
    extra_ignores: Vec<String>,
}

impl FileDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extra_ignores: Vec::new(),
        }
    }

    /// Add configured directory names to the exclusion set
    pub fn with_extra_ignores(mut self, dirs: &[String]) -> Self {
        self.extra_ignores = dirs.to_vec();
        self
    }

    /// Walk the tree and return sorted absolute paths of candidate files
    ///
    /// Gitignore rules apply even when the root is not a git checkout.
    pub fn discover(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let extra = self.extra_ignores.clone();
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .require_git(false);
        builder.filter_entry(move |entry| !is_excluded_dir(entry.path(), &extra));

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    let Some(file_type) = entry.file_type() else {
                        continue;
                    };
                    if !file_type.is_file() {
                        continue;
                    }

                    let path = entry.path();
                    if let Ok(meta) = entry.metadata() {
                        if meta.len() > MAX_FILE_SIZE_BYTES {
                            tracing::debug!("Skipping large file {}", path.display());
                            continue;
                        }
                    }

                    if !is_supported_file(path) {
                        continue;
                    }

                    files.push(path.to_path_buf());
                }
                Err(e) => tracing::warn!("Failed to read entry: {e}"),
            }
        }

        files.sort();
        tracing::debug!("Discovered {} candidate files", files.len());
        files
    }
}

/// Check whether the path sits in (or is) an excluded directory
fn is_excluded_dir(path: &Path, extra: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    EXCLUDED_DIRS.contains(&name) || extra.iter().any(|d| d == name)
}

/// Check whether a file has a supported language extension
fn is_supported_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(Language::from_extension)
        .is_some()
}
