//! Outline rendering
//!
//! Turns a scan result into the condensed outline printed to the terminal:
//! one block per file, one line per entity, indented by nesting depth.
//! The exact formatting is presentation only; nothing downstream parses it.

use crate::scan::CodeMap;
use anyhow::Result;

/// Longest headline printed before truncation
const MAX_HEADLINE_CHARS: usize = 96;

/// Render the map as an indented text outline
///
/// With a search pattern, only chunks whose headline contains the pattern
/// (case-insensitive) survive; files left without chunks are dropped.
pub fn render_text(map: &CodeMap, search: Option<&str>) -> String {
    let needle = search.map(str::to_lowercase);
    let mut out = String::new();

    for (path, chunks) in map {
        let mut lines = Vec::new();

        for chunk in chunks {
            let headline = chunk.headline();
            if let Some(ref needle) = needle {
                if !headline.to_lowercase().contains(needle.as_str()) {
                    continue;
                }
            }

            let indent = "  ".repeat(chunk.depth() + 1);
            lines.push(format!("{}{}", indent, truncate(headline)));
        }

        if lines.is_empty() {
            continue;
        }

        out.push_str(path);
        out.push('\n');
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
        out.push('\n');
    }

    out
}

/// Print the outline in text format
pub fn print_text(map: &CodeMap, search: Option<&str>) {
    let rendered = render_text(map, search);
    if rendered.is_empty() {
        println!("No entities found.");
    } else {
        print!("{}", rendered);
    }
}

/// Print the full map in JSON format
pub fn print_json(map: &CodeMap) -> Result<()> {
    let json = serde_json::to_string_pretty(map)?;
    println!("{}", json);
    Ok(())
}

fn truncate(line: &str) -> String {
    if line.chars().count() <= MAX_HEADLINE_CHARS {
        line.to_string()
    } else {
        let cut: String = line.chars().take(MAX_HEADLINE_CHARS).collect();
        format!("{}…", cut)
    }
}
