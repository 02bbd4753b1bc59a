//! Entity extraction module
//!
//! Extracts structural units from source files using tree-sitter:
//! - Functions, methods, structs, classes, enums, traits
//! - Import declarations (filtered out by default)
//!
//! Each extracted unit carries its source text plus boundary metadata:
//! the documentation attached to it and the names of its ancestors
//! (modules, impl blocks, classes), which give the outline its nesting.

pub mod code;

pub use code::{EntityExtractor, Language};

use serde::{Deserialize, Serialize};

/// One extracted structural unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityChunk {
    /// Raw source text of the entity
    pub content: String,
    /// Extractor-supplied metadata for the entity
    pub boundary: Boundary,
}

impl EntityChunk {
    /// First non-empty source line, used as the outline headline
    pub fn headline(&self) -> &str {
        self.content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("")
    }

    /// Nesting depth of the entity
    pub fn depth(&self) -> usize {
        self.boundary.parent.len()
    }
}

/// Boundary metadata attached to a chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundary {
    /// Documentation attached to the entity, if any
    pub docs: Option<String>,
    /// Names of the enclosing entities, outermost first
    pub parent: Vec<String>,
}

/// Kind of extracted entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Function,
    Method,
    Struct,
    Class,
    Enum,
    Trait,
    Import,
}

impl EntityKind {
    /// Canonical label for the kind
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Function => "function",
            EntityKind::Method => "method",
            EntityKind::Struct => "struct",
            EntityKind::Class => "class",
            EntityKind::Enum => "enum",
            EntityKind::Trait => "trait",
            EntityKind::Import => "import",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Inclusion policy applied while extracting
///
/// A closed set of policies rather than a caller-supplied predicate; the
/// default drops import/include-style declarations from the outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChunkFilter {
    /// Keep everything except entities whose kind label contains "import"
    #[default]
    ExcludeImports,
    /// Keep every extracted entity
    IncludeAll,
}

impl ChunkFilter {
    /// Decide whether an entity of the given kind is included
    pub fn should_include(&self, kind: EntityKind) -> bool {
        match self {
            ChunkFilter::IncludeAll => true,
            ChunkFilter::ExcludeImports => !kind.label().contains("import"),
        }
    }
}
