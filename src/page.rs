//! A scrollable terminal page showing one document at a time.
//!
//! Rows are mapped to pixels with a fixed row height so the coordinator's pixel offsets
//! apply unchanged. Switching views simulates a fetch: the page shows a loading state and
//! only reads and mounts the document once the load delay has passed. A failed load puts the
//! previous document back where it was. Programmatic scrolls animate over several frames and
//! end with a native scroll-end signal.

use crate::coordinator::{AnchorRect, Page};
use crate::document::Document;
use crate::formats::markdown::MarkdownFormat;
use crate::section::{Section, ViewId};
use std::fmt;
use std::time::{Duration, Instant};

/// Remaining distance under which an animation snaps to its target.
const SNAP_PX: f64 = 0.5;

#[derive(Clone, Debug, PartialEq, Eq)]
/// A view switch waiting for its simulated fetch.
pub struct PendingLoad {
    /// View being loaded.
    pub view: ViewId,
    /// When the fetch completes.
    pub ready_at: Instant,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Signals produced by one animation frame of the page.
pub struct FrameEvents {
    /// The scroll position changed.
    pub scrolled: bool,
    /// An animated scroll reached its target.
    pub scroll_ended: bool,
    /// A pending load finished, successfully or not.
    pub loaded: Option<bool>,
}

#[derive(Debug)]
/// Terminal implementation of [`Page`].
pub struct TerminalPage {
    catalog: Vec<Document>,
    mounted: Document,
    loading: Option<PendingLoad>,
    load_error: Option<String>,
    now: Instant,
    scroll_y: f64,
    restore_scroll_y: f64,
    viewport_rows: usize,
    row_height: f64,
    easing: f64,
    load_delay: Duration,
    animation_target: Option<f64>,
}

impl TerminalPage {
    #[must_use]
    /// Creates a page over a catalog of documents, mounting the first one.
    ///
    /// Returns `None` for an empty catalog.
    pub fn new(
        catalog: Vec<Document>,
        row_height: f64,
        easing: f64,
        load_delay: Duration,
        now: Instant,
    ) -> Option<Self> {
        let first = catalog.first()?.clone();
        Some(Self {
            catalog,
            mounted: first,
            loading: None,
            load_error: None,
            now,
            scroll_y: 0.0,
            restore_scroll_y: 0.0,
            viewport_rows: 0,
            row_height,
            easing: easing.clamp(0.01, 1.0),
            load_delay,
            animation_target: None,
        })
    }

    #[must_use]
    /// Documents available as views, in sidebar order.
    pub fn catalog(&self) -> &[Document] {
        &self.catalog
    }

    #[must_use]
    /// The view switch in progress, if any.
    pub fn loading(&self) -> Option<&PendingLoad> {
        self.loading.as_ref()
    }

    #[must_use]
    /// The last document mounted, even while a view switch is hiding it.
    pub fn mounted(&self) -> &Document {
        &self.mounted
    }

    #[must_use]
    /// The mounted document, unless a view switch is hiding it.
    pub fn document(&self) -> Option<&Document> {
        match self.loading {
            Some(_) => None,
            None => Some(&self.mounted),
        }
    }

    #[must_use]
    /// Why the last view switch failed, until the next one starts.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    #[must_use]
    /// Whether an animated scroll is in progress.
    pub fn is_animating(&self) -> bool {
        self.animation_target.is_some()
    }

    #[must_use]
    /// Rows shown by the document pane.
    pub fn viewport_rows(&self) -> usize {
        self.viewport_rows
    }

    #[must_use]
    /// Pixels per document row.
    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    /// Records how many rows the document pane shows.
    pub fn set_viewport_rows(&mut self, rows: usize) {
        self.viewport_rows = rows;
        self.scroll_y = self.scroll_y.min(self.max_scroll());
    }

    #[allow(clippy::cast_precision_loss)]
    fn max_scroll(&self) -> f64 {
        let lines = self.document().map_or(0, |doc| doc.lines.len());
        (lines.saturating_sub(self.viewport_rows) as f64 * self.row_height).max(0.0)
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    /// First document row visible at the current scroll position.
    pub fn top_row(&self) -> usize {
        (self.scroll_y / self.row_height).round().max(0.0) as usize
    }

    #[allow(clippy::cast_precision_loss)]
    /// Scrolls by whole rows as the user would. Returns whether the position changed.
    ///
    /// User input interrupts any running animation.
    pub fn scroll_by_rows(&mut self, rows: isize) -> bool {
        self.animation_target = None;
        let before = self.scroll_y;
        self.scroll_y = (self.scroll_y + rows as f64 * self.row_height).clamp(0.0, self.max_scroll());
        (self.scroll_y - before).abs() > f64::EPSILON
    }

    /// Advances the clock by one frame: completes due loads and steps the animation.
    pub fn advance_frame(&mut self, now: Instant) -> FrameEvents {
        self.now = now;
        let mut events = FrameEvents::default();

        if let Some(load) = self.loading.take_if(|load| now >= load.ready_at) {
            events.loaded = Some(self.mount(&load.view));
        }

        if let Some(target) = self.animation_target {
            let remaining = target - self.scroll_y;
            if remaining.abs() <= SNAP_PX {
                self.scroll_y = target;
                self.animation_target = None;
                events.scroll_ended = true;
            } else {
                let step = (remaining.abs() * self.easing).max(self.row_height);
                if step >= remaining.abs() {
                    self.scroll_y = target;
                } else {
                    self.scroll_y += step.copysign(remaining);
                }
                events.scrolled = true;
            }
        }
        events
    }

    fn mount(&mut self, view: &ViewId) -> bool {
        let Some(path) = self
            .catalog
            .iter()
            .find(|doc| &doc.view == view)
            .map(|doc| doc.path.clone())
        else {
            self.restore_previous(view, &"not in the catalog");
            return false;
        };
        match Document::load(view.clone(), &path, &MarkdownFormat) {
            Ok(doc) => {
                tracing::debug!(view = %view, "Mounted view");
                self.mounted = doc;
                true
            }
            Err(e) => {
                self.restore_previous(view, &e);
                false
            }
        }
    }

    fn restore_previous(&mut self, view: &ViewId, reason: &dyn fmt::Display) {
        tracing::warn!(view = %view, error = %reason, "Failed to load view; keeping previous");
        self.load_error = Some(format!("Failed to load {view}: {reason}"));
        self.scroll_y = self.restore_scroll_y.min(self.max_scroll());
    }
}

impl Page for TerminalPage {
    fn now(&self) -> Instant {
        self.now
    }

    #[allow(clippy::cast_precision_loss)]
    fn anchor_rect(&self, anchor_id: &str) -> Option<AnchorRect> {
        let heading = self.document()?.heading_for_anchor(anchor_id)?;
        Some(AnchorRect {
            top: heading.line_start as f64 * self.row_height - self.scroll_y,
            height: heading.height() as f64 * self.row_height,
        })
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn smooth_scroll_to(&mut self, y: f64) {
        self.animation_target = Some(y.clamp(0.0, self.max_scroll()));
    }

    fn sections_for(&self, view: &ViewId) -> Option<Vec<Section>> {
        self.catalog
            .iter()
            .find(|doc| &doc.view == view)
            .map(Document::sections)
    }

    fn switch_view(&mut self, view: &ViewId) {
        if self.loading.is_none() {
            self.restore_scroll_y = self.scroll_y;
        }
        self.animation_target = None;
        self.scroll_y = 0.0;
        self.load_error = None;
        self.loading = Some(PendingLoad {
            view: view.clone(),
            ready_at: self.now + self.load_delay,
        });
    }
}

#[cfg(test)]
#[path = "tests/page.rs"]
mod tests;
