//! Cancellable work scheduled for a later animation frame or a clock deadline.
//!
//! Every scheduled item gets a [`TaskHandle`]. Superseding work is an explicit
//! `cancel` followed by a new `request_frame`/`set_timeout`, so a stale callback can never
//! fire after the operation that owned it was replaced.
//!
//! Frame tasks requested while a frame is being drained wait for the next frame: callers
//! take a [`FrameCutoff`] when the frame starts and only pop tasks queued before it.

use std::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Identifies one scheduled task so it can be cancelled before it runs.
pub struct TaskHandle(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Boundary between tasks belonging to the current frame and those queued during it.
pub struct FrameCutoff(u64);

#[derive(Debug)]
/// Single-threaded queue of frame tasks and timers.
pub struct Scheduler<T> {
    next_id: u64,
    frame_tasks: Vec<(TaskHandle, T)>,
    timers: Vec<(TaskHandle, Instant, T)>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    #[must_use]
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self {
            next_id: 0,
            frame_tasks: Vec::new(),
            timers: Vec::new(),
        }
    }

    fn next_handle(&mut self) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        handle
    }

    /// Queues a task for the next animation frame.
    pub fn request_frame(&mut self, task: T) -> TaskHandle {
        let handle = self.next_handle();
        self.frame_tasks.push((handle, task));
        handle
    }

    /// Queues a task to run once the clock reaches `deadline`.
    pub fn set_timeout(&mut self, deadline: Instant, task: T) -> TaskHandle {
        let handle = self.next_handle();
        self.timers.push((handle, deadline, task));
        handle
    }

    /// Removes a task if it has not run yet. Returns whether anything was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        if let Some(pos) = self.frame_tasks.iter().position(|(h, _)| *h == handle) {
            self.frame_tasks.remove(pos);
            return true;
        }
        if let Some(pos) = self.timers.iter().position(|(h, _, _)| *h == handle) {
            self.timers.remove(pos);
            return true;
        }
        false
    }

    /// Cancels the task held in `slot`, if any, leaving the slot empty.
    pub fn cancel_slot(&mut self, slot: &mut Option<TaskHandle>) {
        if let Some(handle) = slot.take() {
            self.cancel(handle);
        }
    }

    #[must_use]
    /// Whether the task is still waiting to run.
    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.frame_tasks.iter().any(|(h, _)| *h == handle)
            || self.timers.iter().any(|(h, _, _)| *h == handle)
    }

    #[must_use]
    /// Marks the start of a frame; tasks queued after this point wait for the next one.
    pub fn frame_cutoff(&self) -> FrameCutoff {
        FrameCutoff(self.next_id)
    }

    /// Pops the oldest frame task queued before `cutoff`.
    pub fn next_frame_task(&mut self, cutoff: FrameCutoff) -> Option<(TaskHandle, T)> {
        let pos = self.frame_tasks.iter().position(|(h, _)| h.0 < cutoff.0)?;
        Some(self.frame_tasks.remove(pos))
    }

    /// Pops the earliest timer whose deadline is at or before `now`.
    pub fn next_due_timer(&mut self, now: Instant) -> Option<(TaskHandle, T)> {
        let pos = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, (_, deadline, _))| *deadline <= now)
            .min_by_key(|(_, (handle, deadline, _))| (*deadline, *handle))
            .map(|(pos, _)| pos)?;
        let (handle, _, task) = self.timers.remove(pos);
        Some((handle, task))
    }

    #[must_use]
    /// Number of frame tasks and timers still pending.
    pub fn len(&self) -> usize {
        self.frame_tasks.len() + self.timers.len()
    }

    #[must_use]
    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every pending task.
    pub fn clear(&mut self) {
        self.frame_tasks.clear();
        self.timers.clear();
    }
}

#[cfg(test)]
#[path = "tests/scheduler.rs"]
mod tests;
