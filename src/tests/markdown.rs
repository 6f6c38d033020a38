use super::MarkdownFormat;
use crate::formats::Format;

#[test]
fn test_heading_level_and_title() {
    let format = MarkdownFormat;
    assert_eq!(format.heading("# Info\n"), Some((1, "Info".to_string())));
    assert_eq!(
        format.heading("### Awards ###"),
        Some((3, "Awards".to_string()))
    );
}

#[test]
fn test_rejects_empty_or_non_headings() {
    let format = MarkdownFormat;
    assert_eq!(format.heading("#"), None);
    assert_eq!(format.heading("plain text"), None);
    assert_eq!(format.heading("####### too deep"), None);
}

#[test]
fn test_default_extension() {
    assert_eq!(MarkdownFormat.file_extension(), "md");
}
