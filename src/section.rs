//! Section representation for scroll-spy navigation.
//!
//! A section is a named region of a scrollable page. Its anchor marks where the
//! section starts, and sections keep the order in which they are displayed so that
//! the first one can act as the fallback when nothing has been scrolled past yet.

use serde::Serialize;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
/// Name of a page view owning one ordered set of sections.
pub struct ViewId(String);

impl ViewId {
    #[must_use]
    /// Wraps a view name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    /// The view name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ViewId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Named, anchorable region of a page tracked for navigation highlighting.
pub struct Section {
    /// Stable identifier used by navigation and the active-section indicator.
    pub key: String,
    /// Identifier of the element marking where the section starts.
    pub anchor_id: String,
    /// Label shown in the navigation sidebar.
    pub title: String,
}

impl Section {
    #[must_use]
    /// Builds a section whose anchor is derived from its key as `section-{key}`.
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            anchor_id: format!("section-{key}"),
            key,
            title: title.into(),
        }
    }

    #[must_use]
    /// Builds a section from a heading, slugging the title into its key.
    pub fn from_heading(title: &str) -> Self {
        Self::new(slugify(title), title.trim())
    }
}

#[must_use]
/// Lowercases a title and collapses every run of non-alphanumerics into one `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[must_use]
/// Makes section keys unique within a view by suffixing repeats with `-2`, `-3`, ...
pub fn dedupe_keys(mut sections: Vec<Section>) -> Vec<Section> {
    let mut seen = std::collections::HashMap::<String, usize>::new();
    for section in &mut sections {
        let count = seen.entry(section.key.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            let key = format!("{}-{}", section.key, count);
            *section = Section::new(key, std::mem::take(&mut section.title));
        }
    }
    sections
}

#[cfg(test)]
#[path = "tests/section.rs"]
mod tests;
