//! Entity extraction using tree-sitter
//!
//! The grammar crates do all the parsing; this module only walks the tree,
//! decides which nodes become chunks, and records nesting. Containers
//! (Rust modules and impl blocks, Python classes) contribute their name to
//! the ancestor path of everything inside them.

use super::{Boundary, ChunkFilter, EntityChunk, EntityKind};
use anyhow::{Context, Result};
use std::path::Path;
use tree_sitter::Node;

/// Supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Rust,
    Python,
}

impl Language {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "rs" => Some(Language::Rust),
            "py" => Some(Language::Python),
            _ => None,
        }
    }

    /// Get the tree-sitter language for this language
    pub fn tree_sitter_language(&self) -> tree_sitter::Language {
        match self {
            Language::Rust => tree_sitter_rust::LANGUAGE.into(),
            Language::Python => tree_sitter_python::LANGUAGE.into(),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::Rust => write!(f, "rust"),
            Language::Python => write!(f, "python"),
        }
    }
}

/// Extracts entity chunks from source files
pub struct EntityExtractor {
    rust_parser: tree_sitter::Parser,
    python_parser: tree_sitter::Parser,
}

impl EntityExtractor {
    /// Create a new extractor with parsers for every supported language
    pub fn new() -> Result<Self> {
        let mut rust_parser = tree_sitter::Parser::new();
        rust_parser
            .set_language(&Language::Rust.tree_sitter_language())
            .context("Failed to set Rust language")?;

        let mut python_parser = tree_sitter::Parser::new();
        python_parser
            .set_language(&Language::Python.tree_sitter_language())
            .context("Failed to set Python language")?;

        Ok(Self {
            rust_parser,
            python_parser,
        })
    }

    /// Extract chunks from a file, in source order
    pub fn extract(
        &mut self,
        path: &Path,
        content: &str,
        filter: ChunkFilter,
    ) -> Result<Vec<EntityChunk>> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let language = Language::from_extension(extension)
            .ok_or_else(|| anyhow::anyhow!("Unsupported language: {:?}", path))?;

        match language {
            Language::Rust => self.extract_rust(content, filter),
            Language::Python => self.extract_python(content, filter),
        }
    }

    fn extract_rust(&mut self, content: &str, filter: ChunkFilter) -> Result<Vec<EntityChunk>> {
        let tree = self
            .rust_parser
            .parse(content, None)
            .ok_or_else(|| anyhow::anyhow!("Failed to parse Rust file"))?;

        let mut chunks = Vec::new();
        let mut ancestors = Vec::new();
        walk_rust(
            tree.root_node(),
            content,
            &mut ancestors,
            false,
            filter,
            &mut chunks,
        );

        Ok(chunks)
    }

    fn extract_python(&mut self, content: &str, filter: ChunkFilter) -> Result<Vec<EntityChunk>> {
        let tree = self
            .python_parser
            .parse(content, None)
            .ok_or_else(|| anyhow::anyhow!("Failed to parse Python file"))?;

        let mut chunks = Vec::new();
        let mut ancestors = Vec::new();
        walk_python(
            tree.root_node(),
            content,
            &mut ancestors,
            false,
            filter,
            &mut chunks,
        );

        Ok(chunks)
    }
}

/// Walk the Rust AST, accumulating chunks
fn walk_rust(
    node: Node,
    source: &str,
    ancestors: &mut Vec<String>,
    in_impl: bool,
    filter: ChunkFilter,
    chunks: &mut Vec<EntityChunk>,
) {
    match node.kind() {
        "function_item" => {
            let kind = if in_impl {
                EntityKind::Method
            } else {
                EntityKind::Function
            };
            let docs = rust_doc_comment(node, source);
            emit(node, source, kind, docs, ancestors, filter, chunks);
        }
        "struct_item" => {
            let docs = rust_doc_comment(node, source);
            emit(node, source, EntityKind::Struct, docs, ancestors, filter, chunks);
        }
        "enum_item" => {
            let docs = rust_doc_comment(node, source);
            emit(node, source, EntityKind::Enum, docs, ancestors, filter, chunks);
        }
        "trait_item" => {
            let docs = rust_doc_comment(node, source);
            emit(node, source, EntityKind::Trait, docs, ancestors, filter, chunks);
        }
        "use_declaration" => {
            emit(node, source, EntityKind::Import, None, ancestors, filter, chunks);
        }
        "impl_item" => {
            // Methods nest under the implemented type; the impl block
            // itself produces no chunk.
            let type_name = node
                .child_by_field_name("type")
                .and_then(|n| n.utf8_text(source.as_bytes()).ok())
                .unwrap_or("_")
                .to_string();

            ancestors.push(type_name);
            if let Some(body) = node.child_by_field_name("body") {
                let mut cursor = body.walk();
                for child in body.children(&mut cursor) {
                    walk_rust(child, source, ancestors, true, filter, chunks);
                }
            }
            ancestors.pop();
        }
        "mod_item" => {
            // Inline modules contribute a nesting level, nothing more.
            let name = node
                .child_by_field_name("name")
                .and_then(|n| n.utf8_text(source.as_bytes()).ok())
                .unwrap_or("_")
                .to_string();

            ancestors.push(name);
            if let Some(body) = node.child_by_field_name("body") {
                let mut cursor = body.walk();
                for child in body.children(&mut cursor) {
                    walk_rust(child, source, ancestors, false, filter, chunks);
                }
            }
            ancestors.pop();
        }
        _ => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                walk_rust(child, source, ancestors, in_impl, filter, chunks);
            }
        }
    }
}

/// Walk the Python AST, accumulating chunks
fn walk_python(
    node: Node,
    source: &str,
    ancestors: &mut Vec<String>,
    in_class: bool,
    filter: ChunkFilter,
    chunks: &mut Vec<EntityChunk>,
) {
    match node.kind() {
        "function_definition" => {
            let kind = if in_class {
                EntityKind::Method
            } else {
                EntityKind::Function
            };
            let docs = python_docstring(node, source);
            emit(node, source, kind, docs, ancestors, filter, chunks);
        }
        "class_definition" => {
            let docs = python_docstring(node, source);
            emit(node, source, EntityKind::Class, docs, ancestors, filter, chunks);

            let name = node
                .child_by_field_name("name")
                .and_then(|n| n.utf8_text(source.as_bytes()).ok())
                .unwrap_or("_")
                .to_string();

            ancestors.push(name);
            if let Some(body) = node.child_by_field_name("body") {
                let mut cursor = body.walk();
                for child in body.children(&mut cursor) {
                    walk_python(child, source, ancestors, true, filter, chunks);
                }
            }
            ancestors.pop();
        }
        "import_statement" | "import_from_statement" => {
            emit(node, source, EntityKind::Import, None, ancestors, filter, chunks);
        }
        _ => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                walk_python(child, source, ancestors, in_class, filter, chunks);
            }
        }
    }
}

/// Push a chunk for the node if the filter admits its kind
fn emit(
    node: Node,
    source: &str,
    kind: EntityKind,
    docs: Option<String>,
    ancestors: &[String],
    filter: ChunkFilter,
    chunks: &mut Vec<EntityChunk>,
) {
    if !filter.should_include(kind) {
        return;
    }

    let Ok(content) = node.utf8_text(source.as_bytes()) else {
        return;
    };

    chunks.push(EntityChunk {
        content: content.to_string(),
        boundary: Boundary {
            docs,
            parent: ancestors.to_vec(),
        },
    });
}

/// Collect the `///` lines immediately preceding a Rust item
fn rust_doc_comment(node: Node, source: &str) -> Option<String> {
    let prefix = &source[..node.start_byte()];

    let mut doc_lines = Vec::new();
    for line in prefix.lines().rev() {
        let trimmed = line.trim();
        if trimmed.starts_with("///") {
            doc_lines.push(trimmed.trim_start_matches("///").trim());
        } else if trimmed.starts_with("#[") || trimmed.is_empty() {
            // Attributes sit between doc comments and the item
            continue;
        } else {
            break;
        }
    }

    if doc_lines.is_empty() {
        None
    } else {
        doc_lines.reverse();
        Some(doc_lines.join("\n"))
    }
}

/// Extract the docstring of a Python function or class body
fn python_docstring(node: Node, source: &str) -> Option<String> {
    let body = node.child_by_field_name("body")?;

    let mut cursor = body.walk();
    let first = body.children(&mut cursor).next()?;
    if first.kind() != "expression_statement" {
        return None;
    }

    let mut inner_cursor = first.walk();
    for inner in first.children(&mut inner_cursor) {
        if inner.kind() == "string" {
            let text = inner.utf8_text(source.as_bytes()).ok()?;
            let trimmed = text
                .trim_start_matches("\"\"\"")
                .trim_start_matches("'''")
                .trim_end_matches("\"\"\"")
                .trim_end_matches("'''")
                .trim_matches('"')
                .trim_matches('\'')
                .trim();
            return Some(trimmed.to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(code: &str, file: &str, filter: ChunkFilter) -> Vec<EntityChunk> {
        let mut extractor = EntityExtractor::new().unwrap();
        extractor.extract(Path::new(file), code, filter).unwrap()
    }

    #[test]
    fn test_rust_function_with_docs() {
        let code = r#"
/// Greets the caller
/// by name
pub fn hello(name: &str) -> String {
    format!("Hello, {}!", name)
}
"#;
        let chunks = extract(code, "test.rs", ChunkFilter::default());

        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].content.starts_with("pub fn hello"));
        assert_eq!(
            chunks[0].boundary.docs.as_deref(),
            Some("Greets the caller\nby name")
        );
        assert!(chunks[0].boundary.parent.is_empty());
    }

    #[test]
    fn test_rust_impl_methods_nest_under_type() {
        let code = r#"
pub struct Counter {
    value: u64,
}

impl Counter {
    pub fn new() -> Self {
        Self { value: 0 }
    }

    fn bump(&mut self) {
        self.value += 1;
    }
}
"#;
        let chunks = extract(code, "test.rs", ChunkFilter::default());

        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].content.starts_with("pub struct Counter"));
        assert!(chunks[0].boundary.parent.is_empty());
        assert_eq!(chunks[1].boundary.parent, vec!["Counter".to_string()]);
        assert_eq!(chunks[2].boundary.parent, vec!["Counter".to_string()]);
        assert!(chunks[2].content.starts_with("fn bump"));
    }

    #[test]
    fn test_rust_module_nesting_path() {
        let code = r#"
mod outer {
    mod inner {
        pub fn deep() {}
    }
}
"#;
        let chunks = extract(code, "test.rs", ChunkFilter::default());

        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0].boundary.parent,
            vec!["outer".to_string(), "inner".to_string()]
        );
    }

    #[test]
    fn test_rust_imports_filtered_by_default() {
        let code = r#"
use std::collections::HashMap;

pub fn lookup() {}
"#;
        let chunks = extract(code, "test.rs", ChunkFilter::default());
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].content.starts_with("pub fn lookup"));

        let all = extract(code, "test.rs", ChunkFilter::IncludeAll);
        assert_eq!(all.len(), 2);
        assert!(all[0].content.starts_with("use std::collections"));
    }

    #[test]
    fn test_rust_trait_and_enum() {
        let code = r#"
/// Outcome states
pub enum Outcome {
    Done,
    Failed,
}

pub trait Runner {
    fn run(&self) -> Outcome;
}
"#;
        let chunks = extract(code, "test.rs", ChunkFilter::default());

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].boundary.docs.as_deref(), Some("Outcome states"));
        assert!(chunks[1].content.starts_with("pub trait Runner"));
    }

    #[test]
    fn test_rust_docs_skip_attributes() {
        let code = r#"
/// Configuration record
#[derive(Debug, Clone)]
pub struct Config {
    pub retries: u32,
}
"#;
        let chunks = extract(code, "test.rs", ChunkFilter::default());

        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0].boundary.docs.as_deref(),
            Some("Configuration record")
        );
    }

    #[test]
    fn test_python_class_and_methods() {
        let code = r#"
class Greeter:
    """Greets people."""

    def greet(self, name):
        """Say hello."""
        return f"Hello, {name}"

def standalone():
    pass
"#;
        let chunks = extract(code, "test.py", ChunkFilter::default());

        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].content.starts_with("class Greeter"));
        assert_eq!(chunks[0].boundary.docs.as_deref(), Some("Greets people."));
        assert_eq!(chunks[1].boundary.parent, vec!["Greeter".to_string()]);
        assert_eq!(chunks[1].boundary.docs.as_deref(), Some("Say hello."));
        assert!(chunks[2].boundary.parent.is_empty());
    }

    #[test]
    fn test_python_imports_filtered_by_default() {
        let code = r#"
import os
from pathlib import Path

def main():
    pass
"#;
        let chunks = extract(code, "test.py", ChunkFilter::default());
        assert_eq!(chunks.len(), 1);

        let all = extract(code, "test.py", ChunkFilter::IncludeAll);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_comment_only_file_yields_nothing() {
        let chunks = extract("// nothing here\n", "test.rs", ChunkFilter::default());
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_unsupported_extension_errors() {
        let mut extractor = EntityExtractor::new().unwrap();
        let result = extractor.extract(Path::new("test.txt"), "hello", ChunkFilter::default());
        assert!(result.is_err());
    }
}
