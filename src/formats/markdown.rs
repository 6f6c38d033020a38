//! Markdown format implementation using tree-sitter-md.
//!
//! Sections come from ATX-style headings (# syntax). The heading level is the number of
//! leading `#` markers and an optional closing run of `#` is dropped from the title.

use crate::formats::Format;

/// Tree-sitter queries for ATX-style markdown headings (# syntax).
pub struct MarkdownFormat;

impl Format for MarkdownFormat {
    fn file_extension(&self) -> &'static str {
        "md"
    }

    fn language(&self) -> tree_sitter::Language {
        tree_sitter_md::LANGUAGE.into()
    }

    fn section_query(&self) -> &'static str {
        "(atx_heading) @heading"
    }

    fn heading(&self, raw: &str) -> Option<(usize, String)> {
        let line = raw.lines().next()?.trim();
        let level = line.chars().take_while(|&c| c == '#').count();
        if level == 0 || level > 6 {
            return None;
        }
        let title = line[level..].trim().trim_end_matches('#').trim();
        if title.is_empty() {
            return None;
        }
        Some((level, title.to_string()))
    }
}

#[cfg(test)]
#[path = "../tests/markdown.rs"]
mod tests;
