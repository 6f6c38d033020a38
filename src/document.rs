//! Documents shown as views, and the headings that become their sections.
//!
//! Each document is parsed once with tree-sitter. Every heading opens a section running to
//! the next heading (or the end of the file), so sections tile the document below the first
//! heading and each one's anchor is the heading line.

use crate::error::SpyError;
use crate::formats::Format;
use crate::section::{dedupe_keys, Section, ViewId};
use std::fs;
use std::path::{Path, PathBuf};
use streaming_iterator::StreamingIterator;
use tree_sitter::{Parser, Query, QueryCursor};

#[derive(Clone, Debug, PartialEq, Eq)]
/// A section heading with the line range it spans.
pub struct Heading {
    /// Navigable section for this heading.
    pub section: Section,
    /// Nesting depth (1 for top-level).
    pub level: usize,
    /// Line of the heading itself, which is the section's anchor.
    pub line_start: usize,
    /// Line where the next section begins or the file ends.
    pub line_end: usize,
}

impl Heading {
    #[must_use]
    /// Number of lines the section occupies.
    pub fn height(&self) -> usize {
        self.line_end - self.line_start
    }
}

#[derive(Clone, Debug)]
/// A parsed document: its text lines and section headings.
pub struct Document {
    /// View this document is shown as.
    pub view: ViewId,
    /// Source file.
    pub path: PathBuf,
    /// Text split into lines.
    pub lines: Vec<String>,
    /// Headings in document order.
    pub headings: Vec<Heading>,
}

impl Document {
    /// Reads and parses a document from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the grammar fails, or the document has
    /// no headings.
    pub fn load(view: ViewId, path: &Path, format: &impl Format) -> Result<Self, SpyError> {
        let text = fs::read_to_string(path).map_err(|source| SpyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(view, path, &text, format)
    }

    /// Parses document text, extracting one section per heading.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar or query cannot be loaded, parsing fails, or the
    /// document has no headings.
    pub fn parse(
        view: ViewId,
        path: &Path,
        text: &str,
        format: &impl Format,
    ) -> Result<Self, SpyError> {
        let language = format.language();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| SpyError::Parser(e.to_string()))?;
        let tree = parser
            .parse(text, None)
            .ok_or_else(|| SpyError::Parser(format!("failed to parse {}", path.display())))?;
        let query = Query::new(&language, format.section_query())
            .map_err(|e| SpyError::Parser(e.to_string()))?;

        let mut found = Vec::new();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, tree.root_node(), text.as_bytes());
        while let Some(m) = matches.next() {
            for capture in m.captures {
                let node = capture.node;
                let Ok(raw) = node.utf8_text(text.as_bytes()) else {
                    continue;
                };
                if let Some((level, title)) = format.heading(raw) {
                    found.push((node.start_position().row, level, title));
                }
            }
        }
        found.sort_by_key(|(line, _, _)| *line);
        found.dedup_by_key(|(line, _, _)| *line);

        if found.is_empty() {
            return Err(SpyError::NoSections(path.to_path_buf()));
        }

        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        let sections = dedupe_keys(
            found
                .iter()
                .map(|(_, _, title)| Section::from_heading(title))
                .collect(),
        );
        let headings = found
            .iter()
            .zip(sections)
            .enumerate()
            .map(|(i, ((line, level, _), section))| Heading {
                section,
                level: *level,
                line_start: *line,
                line_end: found.get(i + 1).map_or(lines.len(), |next| next.0),
            })
            .collect();

        tracing::debug!(view = %view, path = %path.display(), "Parsed document");
        Ok(Self {
            view,
            path: path.to_path_buf(),
            lines,
            headings,
        })
    }

    #[must_use]
    /// Sections in display order.
    pub fn sections(&self) -> Vec<Section> {
        self.headings.iter().map(|h| h.section.clone()).collect()
    }

    #[must_use]
    /// Heading whose section has the given anchor.
    pub fn heading_for_anchor(&self, anchor_id: &str) -> Option<&Heading> {
        self.headings
            .iter()
            .find(|h| h.section.anchor_id == anchor_id)
    }
}

/// Expands paths into the documents to show, descending into directories.
///
/// Files given explicitly are kept whatever their extension; directory entries must match
/// one of `extensions`. Results keep argument order, with directory contents sorted.
///
/// # Errors
///
/// Returns an error if a directory cannot be read.
pub fn find_documents(paths: Vec<PathBuf>, extensions: &[String]) -> Result<Vec<PathBuf>, SpyError> {
    let mut documents = Vec::new();
    for path in paths {
        if path.is_dir() {
            collect_dir(&path, extensions, &mut documents)?;
        } else {
            documents.push(path);
        }
    }
    Ok(documents)
}

fn collect_dir(dir: &Path, extensions: &[String], out: &mut Vec<PathBuf>) -> Result<(), SpyError> {
    let entries = fs::read_dir(dir).map_err(|source| SpyError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    paths.sort();
    for path in paths {
        if path.is_dir() {
            collect_dir(&path, extensions, out)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| e == ext))
        {
            out.push(path);
        }
    }
    Ok(())
}

#[must_use]
/// Names views after file stems, numbering repeats so each view is unique.
pub fn view_ids(paths: &[PathBuf]) -> Vec<ViewId> {
    let mut taken: Vec<String> = Vec::with_capacity(paths.len());
    for path in paths {
        let stem = path
            .file_stem()
            .map_or_else(|| "document".to_string(), |s| s.to_string_lossy().into_owned());
        let mut name = stem.clone();
        let mut n = 2;
        while taken.contains(&name) {
            name = format!("{stem}-{n}");
            n += 1;
        }
        taken.push(name);
    }
    taken.into_iter().map(ViewId::new).collect()
}

#[cfg(test)]
#[path = "tests/document.rs"]
mod tests;
