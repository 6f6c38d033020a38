//! Format trait and implementations for different document types.
//!
//! A format supplies the tree-sitter grammar and the query locating section headings,
//! plus the rule turning a matched heading into a nesting level and a title.

pub mod markdown;

/// Grammar and heading rules for one document format.
pub trait Format {
    /// File suffix this format reads by default.
    fn file_extension(&self) -> &'static str;
    /// Tree-sitter grammar for the format.
    fn language(&self) -> tree_sitter::Language;
    /// Query capturing each section heading as `@heading`.
    fn section_query(&self) -> &str;
    /// Splits the source text of a captured heading into nesting level and title.
    fn heading(&self, raw: &str) -> Option<(usize, String)>;
}
