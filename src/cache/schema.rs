//! Database schema definition

/// SQL schema for the map cache database
///
/// Keys are absolute file paths. The TEXT primary key gives a sorted b-tree
/// index, so a subtree clear is a contiguous range scan rather than a full
/// table walk.
pub const SCHEMA: &str = r#"
-- Extraction results keyed by absolute file path
CREATE TABLE IF NOT EXISTS map_entries (
    path TEXT PRIMARY KEY,
    fingerprint TEXT NOT NULL,
    chunks TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;
