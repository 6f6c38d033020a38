//! Settle detection for animated scrolls.
//!
//! An animated scroll is treated as finished once the scroll position has moved by at most
//! one pixel across a run of consecutive samples. Positions are rounded before comparison
//! so sub-pixel jitter does not reset the run.

/// Largest per-sample displacement still counted as "not moving".
pub const STABLE_DELTA_PX: f64 = 1.0;

#[derive(Clone, Debug, PartialEq)]
/// Counts consecutive low-displacement scroll samples.
pub struct SettleDetector {
    last_y: f64,
    stable_samples: u32,
    required: u32,
}

impl SettleDetector {
    #[must_use]
    /// Starts watching from the position the scroll begins at.
    pub fn new(start_y: f64, required: u32) -> Self {
        Self {
            last_y: start_y.round(),
            stable_samples: 0,
            required,
        }
    }

    /// Records one scroll sample. Returns `true` once the scroll counts as settled.
    pub fn sample(&mut self, y: f64) -> bool {
        let y = y.round();
        if (y - self.last_y).abs() <= STABLE_DELTA_PX {
            self.stable_samples += 1;
        } else {
            self.stable_samples = 0;
        }
        self.last_y = y;
        self.stable_samples >= self.required
    }

    #[must_use]
    /// Consecutive stable samples seen so far.
    pub fn stable_samples(&self) -> u32 {
        self.stable_samples
    }
}

#[cfg(test)]
#[path = "tests/settle.rs"]
mod tests;
