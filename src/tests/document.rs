use super::{find_documents, view_ids, Document};
use crate::error::SpyError;
use crate::formats::markdown::MarkdownFormat;
use crate::section::ViewId;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PROFILE: &str = "\
Intro text before any heading.

# Info

Name and contact.

## Experience

- Teaching assistant
- Lab intern

## Awards

Dean's list
";

#[test]
fn test_headings_tile_the_document() {
    let doc = Document::parse(
        ViewId::from("profile"),
        Path::new("profile.md"),
        PROFILE,
        &MarkdownFormat,
    )
    .unwrap();

    let keys: Vec<String> = doc.sections().into_iter().map(|s| s.key).collect();
    assert_eq!(keys, ["info", "experience", "awards"]);

    let spans: Vec<(usize, usize, usize)> = doc
        .headings
        .iter()
        .map(|h| (h.level, h.line_start, h.line_end))
        .collect();
    assert_eq!(spans, [(1, 2, 6), (2, 6, 11), (2, 11, 14)]);
    assert!(doc.headings.iter().all(|h| h.height() > 0));
}

#[test]
fn test_anchor_lookup() {
    let doc = Document::parse(
        ViewId::from("profile"),
        Path::new("profile.md"),
        PROFILE,
        &MarkdownFormat,
    )
    .unwrap();

    let heading = doc.heading_for_anchor("section-experience").unwrap();
    assert_eq!(doc.lines[heading.line_start], "## Experience");
    assert!(doc.heading_for_anchor("section-missing").is_none());
}

#[test]
fn test_document_without_headings_is_rejected() {
    let err = Document::parse(
        ViewId::from("notes"),
        Path::new("notes.md"),
        "just a paragraph\n",
        &MarkdownFormat,
    )
    .unwrap_err();
    assert!(matches!(err, SpyError::NoSections(_)));
}

#[test]
fn test_load_reports_missing_file() {
    let err = Document::load(
        ViewId::from("gone"),
        Path::new("/nonexistent/gone.md"),
        &MarkdownFormat,
    )
    .unwrap_err();
    assert!(matches!(err, SpyError::Io { .. }));
}

#[test]
fn test_find_documents_scans_directories_by_extension() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("b.md"), "# B\n").unwrap();
    fs::write(dir.path().join("a.md"), "# A\n").unwrap();
    fs::write(dir.path().join("skip.txt"), "# no\n").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested").join("c.md"), "# C\n").unwrap();

    let found = find_documents(vec![dir.path().to_path_buf()], &["md".to_string()]).unwrap();
    let names: Vec<String> = found
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["a.md", "b.md", "c.md"]);
}

#[test]
fn test_view_ids_are_unique() {
    let ids = view_ids(&[
        PathBuf::from("a/profile.md"),
        PathBuf::from("b/profile.md"),
        PathBuf::from("archive.md"),
    ]);
    let names: Vec<&str> = ids.iter().map(ViewId::as_str).collect();
    assert_eq!(names, ["profile", "profile-2", "archive"]);
}
