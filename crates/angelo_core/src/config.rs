//! Run loop configuration.
//!
//! # Responsibility
//! - Hold the knobs that shape the blocking run loop.
//! - Load overrides from `ANGELO_*` environment variables.
//!
//! # Invariants
//! - Loading never fails; malformed overrides fall back to defaults and are
//!   reported through `log::warn!`.

use log::warn;
use std::time::Duration;

pub const ENV_TICK_MS: &str = "ANGELO_TICK_MS";
pub const ENV_QUIT_ON_LAST_WINDOW: &str = "ANGELO_QUIT_ON_LAST_WINDOW";
pub const ENV_MAX_FRAMES: &str = "ANGELO_MAX_FRAMES";

const DEFAULT_TICK_MS: u64 = 16;
const MAX_TICK_MS: u64 = 1_000;

/// Run loop policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLoopConfig {
    /// Upper bound on how long the loop sleeps waiting for an event.
    pub tick: Duration,
    /// Stop once every window the application owned has been closed.
    pub quit_on_last_window_closed: bool,
    /// Stop after this many frames. `None` runs until another condition holds.
    pub max_frames: Option<u64>,
}

impl Default for RunLoopConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            quit_on_last_window_closed: true,
            max_frames: None,
        }
    }
}

impl RunLoopConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`, which maps a variable name to its
    /// value when set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_TICK_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if (1..=MAX_TICK_MS).contains(&ms) => {
                    config.tick = Duration::from_millis(ms);
                }
                _ => warn!(
                    "event=config_load module=config status=fallback key={} expected=1..={}",
                    ENV_TICK_MS, MAX_TICK_MS
                ),
            }
        }

        if let Some(raw) = lookup(ENV_QUIT_ON_LAST_WINDOW) {
            match parse_flag(&raw) {
                Some(flag) => config.quit_on_last_window_closed = flag,
                None => warn!(
                    "event=config_load module=config status=fallback key={} expected=bool",
                    ENV_QUIT_ON_LAST_WINDOW
                ),
            }
        }

        if let Some(raw) = lookup(ENV_MAX_FRAMES) {
            match raw.trim().parse::<u64>() {
                Ok(0) => config.max_frames = None,
                Ok(frames) => config.max_frames = Some(frames),
                Err(_) => warn!(
                    "event=config_load module=config status=fallback key={} expected=u64",
                    ENV_MAX_FRAMES
                ),
            }
        }

        config
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
