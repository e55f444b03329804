//! Platform seam behind application and window creation.
//!
//! # Responsibility
//! - Isolate the windowing subsystem from handle and lifecycle bookkeeping.
//! - Give creation paths a place to fail without touching the registry.
//!
//! # Invariants
//! - `initialize` is called at most once per runtime, before any window.
//! - `show_window` and `close_window` are only called for handles that
//!   `open_window` accepted.

use crate::handle::WindowHandle;
use crate::model::window::WindowSpec;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "backend error: {}", self.message)
    }
}

impl Error for BackendError {}

/// Windowing subsystem contract.
pub trait Backend {
    /// Short identifier used in log lines.
    fn name(&self) -> &'static str;

    /// Brings up process-wide subsystem state.
    fn initialize(&mut self, app_title: &str) -> Result<(), BackendError>;

    /// Allocates the platform surface for a newly registered window.
    fn open_window(&mut self, window: WindowHandle, spec: &WindowSpec)
        -> Result<(), BackendError>;

    fn show_window(&mut self, window: WindowHandle);

    fn close_window(&mut self, window: WindowHandle);
}

/// Backend with no platform surface; accepts every request.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    open_windows: usize,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surfaces opened and not yet closed.
    pub fn open_windows(&self) -> usize {
        self.open_windows
    }
}

impl Backend for HeadlessBackend {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn initialize(&mut self, _app_title: &str) -> Result<(), BackendError> {
        Ok(())
    }

    fn open_window(
        &mut self,
        _window: WindowHandle,
        _spec: &WindowSpec,
    ) -> Result<(), BackendError> {
        self.open_windows += 1;
        Ok(())
    }

    fn show_window(&mut self, _window: WindowHandle) {}

    fn close_window(&mut self, _window: WindowHandle) {
        self.open_windows = self.open_windows.saturating_sub(1);
    }
}
