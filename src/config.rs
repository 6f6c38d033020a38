//! Configuration to acknowledge developer preferences as well as set defaults.
//!
//! We look for a sectionspy.toml (or the file given with `--config`) and load settings from
//! there. Missing keys fall back to the defaults below, which match the behaviour of the
//! scroll-spy this crate grew out of: a 350px activation line, a 30px nudge on explicit
//! navigation, three stable samples to settle, twelve frames to wait for late content and a
//! 1200ms safety net.

use crate::error::SpyError;
use facet::Facet;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "sectionspy.toml";

#[derive(Facet, Clone, Debug, PartialEq)]
/// User preferences loaded from sectionspy.toml or falling back to defaults.
pub struct Config {
    #[facet(default = 350.0)]
    /// Distance in pixels from the viewport top treated as the activation line.
    pub anchor_offset: f64,
    #[facet(default = 30.0)]
    /// Extra downward nudge in pixels applied on explicit navigation only.
    pub fine_offset: f64,
    #[facet(default = 3)]
    /// Consecutive low-displacement samples required to declare a scroll settled.
    pub settle_stable_frames: u32,
    #[facet(default = 12)]
    /// Animation frames to wait for a navigation target to render.
    pub poll_max_frames: u32,
    #[facet(default = 1200)]
    /// Safety net after which a programmatic scroll is treated as finished.
    pub programmatic_scroll_timeout_ms: u64,
    #[facet(default = 50)]
    /// Delay before the first evaluation after a section set is registered.
    pub initial_sync_delay_ms: u64,
    #[facet(default = 0)]
    /// Minimum time the loading state stays up once a view switch starts.
    pub min_loading_ms: u64,
    #[facet(default = 20.0)]
    /// Pixels per terminal row, so pixel offsets apply to the terminal viewer.
    pub row_height: f64,
    #[facet(default = 16)]
    /// Animation frame period of the terminal viewer.
    pub frame_ms: u64,
    #[facet(default = 300)]
    /// Simulated fetch latency when the viewer switches to another document.
    pub load_delay_ms: u64,
    #[facet(default = 0.25)]
    /// Fraction of the remaining distance covered per frame by smooth scrolling.
    pub scroll_easing: f64,
    #[facet(default = 3)]
    /// Rows moved per arrow key or wheel notch.
    pub scroll_step: usize,
    #[facet(default = vec!["md".to_string()])]
    /// File suffixes to match when scanning directories.
    pub file_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let spy = SpyConfig::default();
        Self {
            anchor_offset: spy.anchor_offset,
            fine_offset: spy.fine_offset,
            settle_stable_frames: spy.settle_stable_frames,
            poll_max_frames: spy.poll_max_frames,
            programmatic_scroll_timeout_ms: millis(spy.programmatic_scroll_timeout),
            initial_sync_delay_ms: millis(spy.initial_sync_delay),
            min_loading_ms: millis(spy.min_loading),
            row_height: 20.0,
            frame_ms: 16,
            load_delay_ms: 300,
            scroll_easing: 0.25,
            scroll_step: 3,
            file_extensions: vec!["md".to_string()],
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Config {
    /// Load configuration from an explicit file, or from sectionspy.toml if present.
    ///
    /// A missing default file means defaults. An unreadable default file is logged and
    /// ignored, whereas problems with an explicit file are reported.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly requested file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SpyError> {
        if let Some(path) = explicit {
            let contents = fs::read_to_string(path).map_err(|source| SpyError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            return Self::parse(&contents, path);
        }

        let path = Path::new(DEFAULT_CONFIG_FILE);
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents, path).or_else(|e| {
                tracing::warn!(error = %e, "Ignoring invalid config file");
                Ok(Self::default())
            }),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Parses TOML contents, filling unset keys with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the contents are not valid TOML for this structure.
    pub fn parse(contents: &str, origin: &Path) -> Result<Self, SpyError> {
        facet_toml::from_str::<Self>(contents).map_err(|e| SpyError::Config {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    #[must_use]
    /// The subset of settings consumed by the scroll coordinator.
    pub fn spy(&self) -> SpyConfig {
        SpyConfig {
            anchor_offset: self.anchor_offset,
            fine_offset: self.fine_offset,
            settle_stable_frames: self.settle_stable_frames,
            poll_max_frames: self.poll_max_frames,
            programmatic_scroll_timeout: Duration::from_millis(self.programmatic_scroll_timeout_ms),
            initial_sync_delay: Duration::from_millis(self.initial_sync_delay_ms),
            min_loading: Duration::from_millis(self.min_loading_ms),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Tuning constants of a [`ScrollCoordinator`](crate::coordinator::ScrollCoordinator).
pub struct SpyConfig {
    /// Activation line in pixels from the viewport top.
    pub anchor_offset: f64,
    /// Extra downward nudge applied to explicit navigation.
    pub fine_offset: f64,
    /// Stable samples needed to declare a programmatic scroll settled.
    pub settle_stable_frames: u32,
    /// Frames to wait for a pending target to render.
    pub poll_max_frames: u32,
    /// Force-clears the programmatic flag after this long.
    pub programmatic_scroll_timeout: Duration,
    /// Delay of the evaluation scheduled when sections are registered.
    pub initial_sync_delay: Duration,
    /// Minimum duration of the loading state.
    pub min_loading: Duration,
}

impl Default for SpyConfig {
    fn default() -> Self {
        Self {
            anchor_offset: 350.0,
            fine_offset: 30.0,
            settle_stable_frames: 3,
            poll_max_frames: 12,
            programmatic_scroll_timeout: Duration::from_millis(1200),
            initial_sync_delay: Duration::from_millis(50),
            min_loading: Duration::ZERO,
        }
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
