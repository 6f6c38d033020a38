use super::TerminalPage;
use crate::coordinator::Page;
use crate::document::Document;
use crate::formats::markdown::MarkdownFormat;
use crate::section::ViewId;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn write_doc(dir: &TempDir, name: &str, headings: &[&str], body_lines: usize) -> PathBuf {
    let mut text = String::new();
    for heading in headings {
        writeln!(text, "# {heading}").unwrap();
        for i in 0..body_lines {
            writeln!(text, "line {i}").unwrap();
        }
    }
    let path = dir.path().join(format!("{name}.md"));
    fs::write(&path, text).unwrap();
    path
}

fn page_with(dir: &TempDir, t0: Instant) -> TerminalPage {
    let profile = write_doc(dir, "profile", &["Info", "Experience", "Awards"], 20);
    let archive = write_doc(dir, "archive", &["Sent", "Drafts"], 10);
    let catalog = vec![
        Document::load(ViewId::from("profile"), &profile, &MarkdownFormat).unwrap(),
        Document::load(ViewId::from("archive"), &archive, &MarkdownFormat).unwrap(),
    ];
    let mut page =
        TerminalPage::new(catalog, 20.0, 0.25, Duration::from_millis(300), t0).unwrap();
    page.set_viewport_rows(10);
    page
}

#[test]
fn test_anchor_rect_tracks_scroll() {
    let dir = TempDir::new().unwrap();
    let mut page = page_with(&dir, Instant::now());

    let rect = page.anchor_rect("section-experience").unwrap();
    assert!((rect.top - 420.0).abs() < 1e-9, "row 21 at 20px");
    assert!((rect.height - 420.0).abs() < 1e-9);

    assert!(page.scroll_by_rows(5));
    let rect = page.anchor_rect("section-experience").unwrap();
    assert!((rect.top - 320.0).abs() < 1e-9);
    assert!(page.anchor_rect("section-sent").is_none(), "archive not mounted");
}

#[test]
fn test_user_scroll_is_clamped() {
    let dir = TempDir::new().unwrap();
    let mut page = page_with(&dir, Instant::now());

    assert!(!page.scroll_by_rows(-3), "already at top");
    page.scroll_by_rows(1000);
    // 63 lines in a 10-row viewport
    assert!((page.scroll_y() - 53.0 * 20.0).abs() < 1e-9);
    assert_eq!(page.top_row(), 53);
}

#[test]
fn test_view_switch_mounts_after_delay() {
    let dir = TempDir::new().unwrap();
    let t0 = Instant::now();
    let mut page = page_with(&dir, t0);
    page.scroll_by_rows(4);

    page.switch_view(&ViewId::from("archive"));
    assert_eq!(page.loading().map(|l| l.view.as_str()), Some("archive"));
    assert!(page.document().is_none());
    assert!(page.scroll_y().abs() < f64::EPSILON);
    assert!(page.anchor_rect("section-info").is_none());

    let events = page.advance_frame(t0 + Duration::from_millis(100));
    assert_eq!(events.loaded, None);

    let events = page.advance_frame(t0 + Duration::from_millis(300));
    assert_eq!(events.loaded, Some(true));
    assert_eq!(page.document().unwrap().view, ViewId::from("archive"));
    assert!(page.anchor_rect("section-drafts").is_some());
}

#[test]
fn test_failed_load_puts_previous_document_back() {
    let dir = TempDir::new().unwrap();
    let t0 = Instant::now();
    let mut page = page_with(&dir, t0);
    page.scroll_by_rows(7);

    page.switch_view(&ViewId::from("archive"));
    fs::remove_file(dir.path().join("archive.md")).unwrap();

    let events = page.advance_frame(t0 + Duration::from_millis(400));
    assert_eq!(events.loaded, Some(false));
    assert!(page.loading().is_none());
    assert_eq!(page.document().unwrap().view, ViewId::from("profile"));
    assert!((page.scroll_y() - 140.0).abs() < f64::EPSILON, "scroll restored");
    assert!(page.anchor_rect("section-info").is_some());
    assert!(page
        .load_error()
        .is_some_and(|e| e.starts_with("Failed to load archive")));

    page.switch_view(&ViewId::from("profile"));
    assert!(page.load_error().is_none(), "cleared by the next switch");
}

#[test]
fn test_smooth_scroll_eases_then_signals_end() {
    let dir = TempDir::new().unwrap();
    let t0 = Instant::now();
    let mut page = page_with(&dir, t0);

    page.smooth_scroll_to(640.0);
    let mut last = page.scroll_y();
    let mut steps = Vec::new();
    let mut ended = false;
    for frame in 1..100 {
        let events = page.advance_frame(t0 + Duration::from_millis(16 * frame));
        assert!(page.scroll_y() <= 640.0);
        assert!(page.scroll_y() >= last);
        if events.scrolled {
            steps.push(page.scroll_y() - last);
        }
        last = page.scroll_y();
        if events.scroll_ended {
            ended = true;
            break;
        }
    }

    assert!(ended);
    assert!(!page.is_animating());
    assert!((page.scroll_y() - 640.0).abs() < f64::EPSILON);
    assert!(steps.len() > 3, "animated over several frames");
    assert!(steps.first() > steps.last(), "decelerates");
}

#[test]
fn test_user_scroll_interrupts_animation() {
    let dir = TempDir::new().unwrap();
    let mut page = page_with(&dir, Instant::now());

    page.smooth_scroll_to(500.0);
    page.scroll_by_rows(1);
    assert!(!page.is_animating());
}

#[test]
fn test_sections_come_from_catalog() {
    let dir = TempDir::new().unwrap();
    let page = page_with(&dir, Instant::now());

    let keys: Vec<String> = page
        .sections_for(&ViewId::from("archive"))
        .unwrap()
        .into_iter()
        .map(|s| s.key)
        .collect();
    assert_eq!(keys, ["sent", "drafts"]);
    assert!(page.sections_for(&ViewId::from("home")).is_none());
}
