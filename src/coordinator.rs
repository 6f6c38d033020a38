//! The scroll-spy state machine keeping a navigation sidebar in step with a scrolling page.
//!
//! Three things move the page: the user scrolling, the coordinator scrolling to a section
//! after a navigation click, and content arriving late after a view switch. The coordinator
//! owns one [`ScrollState`] and two guards decide who may change the active section:
//!
//! ```text
//!                 navigate (other view)           on_content_ready(true)
//!   Idle ───────────────────────────────► Loading ─────────────────────► Polling
//!    ▲ │ navigate (same view)                │ on_content_ready(false)      │ anchor rendered
//!    │ ▼                                     ▼                              ▼
//!    │ Programmatic ◄────────────────────── Idle                      Programmatic
//!    │      │ settled / scroll end / timeout
//!    └──────┘
//! ```
//!
//! - While `content_loading` is set, passive evaluation does not run at all.
//! - While `is_programmatic_scroll` is set, passive evaluation cannot change the active key.
//!
//! All deferred work goes through a [`Scheduler`] so that each new navigation cancels the
//! anchor poll, settle timeout and pending evaluation of the one it supersedes.

use crate::config::SpyConfig;
use crate::scheduler::{Scheduler, TaskHandle};
use crate::section::{Section, ViewId};
use crate::settle::SettleDetector;
use serde::Serialize;
use std::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq)]
/// Rendered position of an anchor relative to the top of the viewport.
pub struct AnchorRect {
    /// Distance from the viewport top to the anchor's top edge (negative once scrolled past).
    pub top: f64,
    /// Rendered height; zero means the anchor is mounted but not laid out yet.
    pub height: f64,
}

/// What the coordinator needs from the page hosting it.
pub trait Page {
    /// Current time on the host's clock.
    fn now(&self) -> Instant;
    /// Measures an anchor, or `None` if it is not in the page.
    fn anchor_rect(&self, anchor_id: &str) -> Option<AnchorRect>;
    /// Current vertical scroll position in pixels.
    fn scroll_y(&self) -> f64;
    /// Starts an animated scroll to `y`.
    fn smooth_scroll_to(&mut self, y: f64);
    /// Ordered sections of a view, or `None` if the view is unknown.
    fn sections_for(&self, view: &ViewId) -> Option<Vec<Section>>;
    /// Starts showing a view; its content arrives later via `on_content_ready`.
    fn switch_view(&mut self, view: &ViewId);
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Section requested by navigation before its view finished loading.
pub struct PendingTarget {
    /// View the section belongs to.
    pub view: ViewId,
    /// Key of the requested section.
    pub key: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Mutable per-page scroll-spy state. Only the coordinator writes to it.
pub struct ScrollState {
    active_section_key: Option<String>,
    is_programmatic_scroll: bool,
    pending_target: Option<PendingTarget>,
    content_loading: bool,
}

impl ScrollState {
    #[must_use]
    /// Section currently highlighted, if any has been chosen.
    pub fn active_section_key(&self) -> Option<&str> {
        self.active_section_key.as_deref()
    }

    #[must_use]
    /// Whether a code-initiated scroll is still animating.
    pub fn is_programmatic_scroll(&self) -> bool {
        self.is_programmatic_scroll
    }

    #[must_use]
    /// Navigation target waiting for its view's content.
    pub fn pending_target(&self) -> Option<&PendingTarget> {
        self.pending_target.as_ref()
    }

    #[must_use]
    /// Whether the hosting view is still fetching or mounting content.
    pub fn is_content_loading(&self) -> bool {
        self.content_loading
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Serialisable view of the coordinator for diagnostics.
pub struct ScrollSnapshot {
    /// View whose sections are registered.
    pub view: Option<ViewId>,
    /// Highlighted section key.
    pub active_section: Option<String>,
    /// Target waiting for content.
    pub pending_target: Option<PendingTarget>,
    /// Programmatic scroll guard.
    pub programmatic_scroll: bool,
    /// Content loading guard.
    pub content_loading: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// How a navigation request was handled.
pub enum Navigation {
    /// Same view: the section is highlighted and a scroll was requested.
    Scrolling,
    /// Other view: the page was asked to switch and the target is pending.
    SwitchingView,
    /// The target view is still loading; the pending target was replaced.
    Deferred,
    /// Unknown view or section key.
    Ignored,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Task {
    EvaluateActive,
    InitialSync,
    PollTarget { frames_left: u32 },
    FinishLoading,
    SettleTimeout,
}

#[derive(Debug, Default)]
struct Handles {
    spy_frame: Option<TaskHandle>,
    initial_sync: Option<TaskHandle>,
    poll: Option<TaskHandle>,
    finish_loading: Option<TaskHandle>,
    settle_timeout: Option<TaskHandle>,
}

/// Picks the section whose anchor most recently crossed the activation line.
///
/// Anchors that are missing or have no height are skipped. Among the rest, those with
/// `top - anchor_offset <= 0` are candidates and the one closest to zero wins, earlier
/// sections winning ties. With no candidate the first section is returned.
#[must_use]
pub fn pick_active<'a>(
    sections: &'a [Section],
    anchor_offset: f64,
    measure: impl Fn(&str) -> Option<AnchorRect>,
) -> Option<&'a Section> {
    let mut best: Option<(&Section, f64)> = None;
    for section in sections {
        let Some(rect) = measure(&section.anchor_id) else {
            continue;
        };
        if rect.height <= 0.0 {
            continue;
        }
        let top_adjusted = rect.top - anchor_offset;
        if top_adjusted <= 0.0 && best.is_none_or(|(_, best_top)| top_adjusted > best_top) {
            best = Some((section, top_adjusted));
        }
    }
    best.map(|(section, _)| section).or_else(|| sections.first())
}

/// Keeps the active section consistent with passive scrolling and explicit navigation.
///
/// One coordinator belongs to one hosting page. Dropping it discards every scheduled task.
#[derive(Debug)]
pub struct ScrollCoordinator {
    config: SpyConfig,
    view: Option<ViewId>,
    sections: Vec<Section>,
    state: ScrollState,
    scheduler: Scheduler<Task>,
    settle: Option<SettleDetector>,
    loading_since: Option<Instant>,
    handles: Handles,
}

impl ScrollCoordinator {
    #[must_use]
    /// Creates a coordinator with no sections registered.
    pub fn new(config: SpyConfig) -> Self {
        Self {
            config,
            view: None,
            sections: Vec::new(),
            state: ScrollState::default(),
            scheduler: Scheduler::new(),
            settle: None,
            loading_since: None,
            handles: Handles::default(),
        }
    }

    #[must_use]
    /// Tuning constants in use.
    pub fn config(&self) -> &SpyConfig {
        &self.config
    }

    #[must_use]
    /// Current scroll-spy state.
    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    #[must_use]
    /// Section currently highlighted.
    pub fn active_section_key(&self) -> Option<&str> {
        self.state.active_section_key()
    }

    #[must_use]
    /// View whose sections are registered.
    pub fn view(&self) -> Option<&ViewId> {
        self.view.as_ref()
    }

    #[must_use]
    /// Registered sections in display order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    /// View navigation is heading to: the pending one while loading, else the current one.
    pub fn destination_view(&self) -> Option<&ViewId> {
        match &self.state.pending_target {
            Some(pending) if self.state.content_loading => Some(&pending.view),
            _ => self.view.as_ref(),
        }
    }

    #[must_use]
    /// Whether any frame task or timer is still waiting to run.
    pub fn has_scheduled_work(&self) -> bool {
        !self.scheduler.is_empty()
    }

    #[must_use]
    /// Serialisable copy of the state.
    pub fn snapshot(&self) -> ScrollSnapshot {
        ScrollSnapshot {
            view: self.view.clone(),
            active_section: self.state.active_section_key.clone(),
            pending_target: self.state.pending_target.clone(),
            programmatic_scroll: self.state.is_programmatic_scroll,
            content_loading: self.state.content_loading,
        }
    }

    fn section(&self, key: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.key == key)
    }

    /// Replaces the section set, resetting the active section and pending target.
    ///
    /// The reset happens on every call, even when the set is identical. Work scheduled for
    /// the previous set is cancelled, including a programmatic scroll still settling, and an
    /// initial evaluation is scheduled so the sidebar gets a highlight without waiting for
    /// the first scroll.
    pub fn register_sections<P: Page + ?Sized>(
        &mut self,
        view: ViewId,
        sections: Vec<Section>,
        page: &P,
    ) {
        tracing::debug!(view = %view, count = sections.len(), "Registering sections");
        self.scheduler.cancel_slot(&mut self.handles.spy_frame);
        self.scheduler.cancel_slot(&mut self.handles.initial_sync);
        self.scheduler.cancel_slot(&mut self.handles.poll);
        self.scheduler.cancel_slot(&mut self.handles.finish_loading);
        if self.settle.is_some() {
            self.finish_programmatic_scroll("sections replaced");
        }

        self.view = Some(view);
        self.sections = sections;
        self.state.active_section_key = None;
        self.state.pending_target = None;

        let deadline = page.now() + self.config.initial_sync_delay;
        self.handles.initial_sync = Some(self.scheduler.set_timeout(deadline, Task::InitialSync));
    }

    /// Recomputes the active section from anchor positions.
    ///
    /// Does nothing while a programmatic scroll or content load is in progress. Returns the
    /// new key when it changed, `None` when it stayed the same or evaluation was skipped.
    pub fn evaluate_active_section<P: Page + ?Sized>(&mut self, page: &P) -> Option<&str> {
        if self.state.is_programmatic_scroll || self.state.content_loading {
            return None;
        }
        let picked = pick_active(&self.sections, self.config.anchor_offset, |id| {
            page.anchor_rect(id)
        })?;
        if self.state.active_section_key.as_deref() == Some(picked.key.as_str()) {
            return None;
        }
        tracing::trace!(section = %picked.key, "Active section changed");
        self.state.active_section_key = Some(picked.key.clone());
        self.state.active_section_key.as_deref()
    }

    /// Handles one scroll event, whether from the user or from an animation.
    ///
    /// Passive evaluation is coalesced into the next animation frame. While a programmatic
    /// scroll is in flight the position is fed to settle detection instead.
    pub fn on_scroll<P: Page + ?Sized>(&mut self, page: &P) {
        if !self.state.is_programmatic_scroll && !self.state.content_loading {
            self.scheduler.cancel_slot(&mut self.handles.spy_frame);
            self.handles.spy_frame = Some(self.scheduler.request_frame(Task::EvaluateActive));
        }
        let settled = self
            .settle
            .as_mut()
            .is_some_and(|detector| detector.sample(page.scroll_y()));
        if settled {
            self.finish_programmatic_scroll("settled");
        }
    }

    /// Handles a native "scroll ended" signal.
    pub fn on_scroll_end<P: Page + ?Sized>(&mut self, _page: &P) {
        if self.settle.is_some() {
            self.finish_programmatic_scroll("scroll end");
        }
    }

    /// Runs the work of one animation frame, then any timers that have come due.
    ///
    /// Frame tasks queued while this frame runs wait for the next call.
    pub fn on_frame<P: Page + ?Sized>(&mut self, page: &mut P) {
        let cutoff = self.scheduler.frame_cutoff();
        while let Some((handle, task)) = self.scheduler.next_frame_task(cutoff) {
            self.run_task(handle, task, page);
        }
        while let Some((handle, task)) = self.scheduler.next_due_timer(page.now()) {
            self.run_task(handle, task, page);
        }
    }

    fn run_task<P: Page + ?Sized>(&mut self, handle: TaskHandle, task: Task, page: &mut P) {
        match task {
            Task::EvaluateActive => {
                clear_if(&mut self.handles.spy_frame, handle);
                self.evaluate_active_section(&*page);
            }
            Task::InitialSync => {
                clear_if(&mut self.handles.initial_sync, handle);
                if self.state.active_section_key.is_none() {
                    self.evaluate_active_section(&*page);
                }
            }
            Task::PollTarget { frames_left } => {
                clear_if(&mut self.handles.poll, handle);
                self.poll_target(frames_left, page);
            }
            Task::FinishLoading => {
                clear_if(&mut self.handles.finish_loading, handle);
                self.resolve_loaded(page);
            }
            Task::SettleTimeout => {
                clear_if(&mut self.handles.settle_timeout, handle);
                if self.settle.is_some() {
                    self.finish_programmatic_scroll("timeout");
                }
            }
        }
    }

    fn cancel_transition(&mut self) {
        self.scheduler.cancel_slot(&mut self.handles.spy_frame);
        self.scheduler.cancel_slot(&mut self.handles.poll);
        self.scheduler.cancel_slot(&mut self.handles.finish_loading);
        self.scheduler.cancel_slot(&mut self.handles.settle_timeout);
    }

    /// Navigates to a section, switching views first when it lives elsewhere.
    ///
    /// In the current view the section is highlighted immediately, before any scrolling.
    /// For another view the page is asked to switch and the target waits for
    /// [`on_content_ready`](Self::on_content_ready). The latest call always wins.
    pub fn navigate_to_section<P: Page + ?Sized>(
        &mut self,
        view: &ViewId,
        key: &str,
        page: &mut P,
    ) -> Navigation {
        if self.destination_view() == Some(view) {
            if self.state.content_loading {
                let known = page
                    .sections_for(view)
                    .is_some_and(|sections| sections.iter().any(|s| s.key == key));
                if !known {
                    return Navigation::Ignored;
                }
                // Resolves when the content arrives
                self.state.pending_target = Some(PendingTarget {
                    view: view.clone(),
                    key: key.to_string(),
                });
                return Navigation::Deferred;
            }
            if self.section(key).is_none() {
                tracing::debug!(view = %view, section = key, "Ignoring unknown section");
                return Navigation::Ignored;
            }
            self.cancel_transition();
            self.state.active_section_key = Some(key.to_string());
            self.scroll_to_section(key, page);
            return Navigation::Scrolling;
        }

        let known = page
            .sections_for(view)
            .is_some_and(|sections| sections.iter().any(|s| s.key == key));
        if !known {
            tracing::debug!(view = %view, section = key, "Ignoring unknown navigation target");
            return Navigation::Ignored;
        }

        tracing::debug!(view = %view, section = key, "Switching view");
        self.cancel_transition();
        // The switch abandons the scroll, so nothing else would drop its guard
        if self.settle.is_some() {
            self.finish_programmatic_scroll("superseded");
        }
        page.switch_view(view);
        self.state.content_loading = true;
        self.state.pending_target = Some(PendingTarget {
            view: view.clone(),
            key: key.to_string(),
        });
        self.loading_since = Some(page.now());
        Navigation::SwitchingView
    }

    /// Reports that the hosting view finished (or failed) loading its content.
    ///
    /// On failure the pending target is dropped without scrolling and the active section is
    /// left as it was. On success the destination sections are registered and the target
    /// anchor is polled for, one check per frame, until it renders or the budget runs out.
    pub fn on_content_ready<P: Page + ?Sized>(&mut self, success: bool, page: &mut P) {
        self.scheduler.cancel_slot(&mut self.handles.poll);
        self.scheduler.cancel_slot(&mut self.handles.finish_loading);

        if !success {
            tracing::debug!("Content failed to load; dropping pending target");
            self.end_loading();
            return;
        }

        if let Some(since) = self.loading_since {
            let ready_at = since + self.config.min_loading;
            if page.now() < ready_at {
                self.handles.finish_loading =
                    Some(self.scheduler.set_timeout(ready_at, Task::FinishLoading));
                return;
            }
        }
        self.resolve_loaded(page);
    }

    fn end_loading(&mut self) {
        self.state.content_loading = false;
        self.state.pending_target = None;
        self.loading_since = None;
    }

    fn resolve_loaded<P: Page + ?Sized>(&mut self, page: &mut P) {
        let Some(target) = self.state.pending_target.take() else {
            self.end_loading();
            return;
        };
        let sections = page.sections_for(&target.view).unwrap_or_default();
        self.register_sections(target.view.clone(), sections, &*page);
        self.state.pending_target = Some(target);
        self.poll_target(self.config.poll_max_frames, page);
    }

    fn poll_target<P: Page + ?Sized>(&mut self, frames_left: u32, page: &mut P) {
        let Some(key) = self.state.pending_target.as_ref().map(|t| t.key.clone()) else {
            self.end_loading();
            return;
        };

        let rendered = self
            .section(&key)
            .and_then(|s| page.anchor_rect(&s.anchor_id))
            .is_some_and(|rect| rect.height > 0.0);

        if rendered {
            self.end_loading();
            self.state.active_section_key = Some(key.clone());
            self.scroll_to_section(&key, page);
        } else if frames_left == 0 {
            tracing::debug!(section = %key, "Target never rendered; not scrolling");
            self.end_loading();
        } else {
            self.handles.poll = Some(self.scheduler.request_frame(Task::PollTarget {
                frames_left: frames_left - 1,
            }));
        }
    }

    /// Smoothly scrolls so the section sits just below the activation line.
    ///
    /// Passive evaluation is suspended until the scroll settles, a native scroll-end
    /// arrives, or the safety timeout fires. Returns `false` when the anchor is missing,
    /// in which case nothing is issued.
    pub fn scroll_to_section<P: Page + ?Sized>(&mut self, key: &str, page: &mut P) -> bool {
        let Some(rect) = self
            .section(key)
            .and_then(|s| page.anchor_rect(&s.anchor_id))
        else {
            tracing::debug!(section = key, "No anchor to scroll to");
            return false;
        };

        let current = page.scroll_y();
        let top = (current + rect.top - self.config.anchor_offset + self.config.fine_offset)
            .max(0.0);

        self.scheduler.cancel_slot(&mut self.handles.spy_frame);
        self.scheduler.cancel_slot(&mut self.handles.settle_timeout);
        self.state.is_programmatic_scroll = true;
        self.settle = Some(SettleDetector::new(
            current,
            self.config.settle_stable_frames,
        ));
        let deadline = page.now() + self.config.programmatic_scroll_timeout;
        self.handles.settle_timeout = Some(self.scheduler.set_timeout(deadline, Task::SettleTimeout));

        tracing::debug!(section = key, from = current, to = top, "Programmatic scroll");
        page.smooth_scroll_to(top);
        true
    }

    fn finish_programmatic_scroll(&mut self, reason: &'static str) {
        tracing::debug!(reason, "Programmatic scroll finished");
        self.settle = None;
        self.scheduler.cancel_slot(&mut self.handles.settle_timeout);
        self.state.is_programmatic_scroll = false;
    }
}

fn clear_if(slot: &mut Option<TaskHandle>, handle: TaskHandle) {
    if *slot == Some(handle) {
        *slot = None;
    }
}

#[cfg(test)]
#[path = "tests/coordinator.rs"]
mod tests;
