//! The application state bridging the terminal page, the scroll coordinator and the sidebar.
//!
//! Input handlers call into this state and the UI reads from it. Each animation frame the
//! page advances first (finishing loads, stepping animations) and the signals it produces
//! are forwarded to the coordinator before the coordinator runs its own frame work.

use crate::config::SpyConfig;
use crate::coordinator::{Navigation, ScrollCoordinator};
use crate::page::TerminalPage;
use crate::section::ViewId;
use std::time::Instant;

#[derive(Clone, Debug, PartialEq, Eq)]
/// One sidebar row: a section of some view.
pub struct NavEntry {
    /// View holding the section.
    pub view: ViewId,
    /// Section key.
    pub key: String,
    /// Label shown in the sidebar.
    pub title: String,
    /// Heading depth, used for indentation.
    pub level: usize,
}

/// Session state of the viewer.
pub struct AppState {
    /// Page the coordinator measures and scrolls.
    pub page: TerminalPage,
    /// Scroll-spy for the page.
    pub spy: ScrollCoordinator,
    /// Sidebar rows across all views.
    pub nav: Vec<NavEntry>,
    /// Sidebar row under the cursor.
    pub selected: usize,
    /// Status feedback displayed in the help bar.
    pub message: Option<String>,
    /// Rows moved per arrow key or wheel notch.
    pub scroll_step: usize,
}

impl AppState {
    #[must_use]
    /// Builds the sidebar from the page catalog and registers the mounted view's sections.
    pub fn new(page: TerminalPage, config: SpyConfig, scroll_step: usize) -> Self {
        let nav = page
            .catalog()
            .iter()
            .flat_map(|doc| {
                doc.headings.iter().map(|h| NavEntry {
                    view: doc.view.clone(),
                    key: h.section.key.clone(),
                    title: h.section.title.clone(),
                    level: h.level,
                })
            })
            .collect();

        let mut spy = ScrollCoordinator::new(config);
        if let Some(doc) = page.document() {
            spy.register_sections(doc.view.clone(), doc.sections(), &page);
        }

        Self {
            page,
            spy,
            nav,
            selected: 0,
            message: None,
            scroll_step,
        }
    }

    /// Runs one animation frame at `now`.
    pub fn tick(&mut self, now: Instant) {
        let events = self.page.advance_frame(now);
        if events.scrolled {
            self.spy.on_scroll(&self.page);
        }
        if events.scroll_ended {
            self.spy.on_scroll_end(&self.page);
        }
        if let Some(ok) = events.loaded {
            self.message = self.page.load_error().map(str::to_string);
            self.spy.on_content_ready(ok, &mut self.page);
            if !ok {
                // The page moved back to where the previous view was left
                self.spy.on_scroll(&self.page);
            }
        }
        self.spy.on_frame(&mut self.page);
    }

    /// Scrolls the document as the user would, by `steps` multiples of the scroll step.
    pub fn scroll(&mut self, steps: isize) {
        let step = isize::try_from(self.scroll_step).unwrap_or(1);
        self.scroll_rows(steps.saturating_mul(step));
    }

    /// Scrolls by whole rows as the user would.
    pub fn scroll_rows(&mut self, rows: isize) {
        if self.page.scroll_by_rows(rows) {
            self.spy.on_scroll(&self.page);
        }
    }

    /// Jumps to the top or bottom of the document as the user would.
    pub fn scroll_to_edge(&mut self, bottom: bool) {
        let lines = self.page.document().map_or(0, |doc| doc.lines.len());
        let rows = isize::try_from(lines).unwrap_or(isize::MAX);
        self.scroll_rows(if bottom { rows } else { -rows });
    }

    /// Moves the sidebar cursor down, wrapping around.
    pub fn select_next(&mut self) {
        if !self.nav.is_empty() {
            self.selected = (self.selected + 1) % self.nav.len();
        }
    }

    /// Moves the sidebar cursor up, wrapping around.
    pub fn select_prev(&mut self) {
        if !self.nav.is_empty() {
            self.selected = self.selected.checked_sub(1).unwrap_or(self.nav.len() - 1);
        }
    }

    /// Navigates to the section under the sidebar cursor.
    pub fn navigate_selected(&mut self) -> Navigation {
        let Some(entry) = self.nav.get(self.selected).cloned() else {
            return Navigation::Ignored;
        };
        self.navigate(&entry.view, &entry.key)
    }

    /// Navigates to the `n`th section (1-based) of the view being shown or loaded.
    pub fn navigate_to_nth(&mut self, n: usize) -> Navigation {
        let Some(view) = self.spy.destination_view().cloned() else {
            return Navigation::Ignored;
        };
        let Some(entry) = self
            .nav
            .iter()
            .filter(|e| e.view == view)
            .nth(n.saturating_sub(1))
            .cloned()
        else {
            return Navigation::Ignored;
        };
        if let Some(pos) = self.nav.iter().position(|e| *e == entry) {
            self.selected = pos;
        }
        self.navigate(&entry.view, &entry.key)
    }

    fn navigate(&mut self, view: &ViewId, key: &str) -> Navigation {
        let outcome = self.spy.navigate_to_section(view, key, &mut self.page);
        self.message = match outcome {
            Navigation::SwitchingView => Some(format!("Loading {view}...")),
            Navigation::Ignored => Some(format!("Cannot navigate to {view}/{key}")),
            Navigation::Scrolling => None,
            Navigation::Deferred => self.message.take(),
        };
        outcome
    }

    #[must_use]
    /// Whether a sidebar row is the highlighted section of the registered view.
    pub fn is_active(&self, entry: &NavEntry) -> bool {
        self.spy.view() == Some(&entry.view)
            && self.spy.active_section_key() == Some(entry.key.as_str())
    }

    #[must_use]
    /// One-line summary of the coordinator guards for the status bar.
    pub fn status_line(&self) -> String {
        let state = self.spy.state();
        let view = self.spy.view().map_or("-", ViewId::as_str);
        let active = state.active_section_key().unwrap_or("-");
        let mut flags = Vec::new();
        if state.is_programmatic_scroll() {
            flags.push("scrolling");
        }
        if state.is_content_loading() {
            flags.push("loading");
        }
        if let Some(pending) = state.pending_target() {
            return format!(
                "{view} | active: {active} | pending: {}/{} | {}",
                pending.view,
                pending.key,
                flags.join(" ")
            );
        }
        format!("{view} | active: {active} | {}", flags.join(" "))
    }
}

#[cfg(test)]
#[path = "tests/app_state.rs"]
mod tests;
