//! Scan configuration
//!
//! An optional `.codemap.toml` at the target root tunes the scan. Missing
//! file means defaults; CLI flags override whatever is loaded.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration file name looked up at the target root
pub const CONFIG_FILE: &str = ".codemap.toml";

/// Per-tree scan configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Maximum number of files read concurrently in one batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Include import/use declarations in the outline
    #[serde(default)]
    pub include_imports: bool,

    /// Extra directory names excluded from discovery
    #[serde(default)]
    pub ignore_dirs: Vec<String>,
}

fn default_batch_size() -> usize {
    50
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            include_imports: false,
            ignore_dirs: Vec::new(),
        }
    }
}

impl ScanConfig {
    /// Load configuration from the target root or return defaults
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_FILE);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file {:?}", config_path))?;
            let config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {:?}", config_path))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }
}
