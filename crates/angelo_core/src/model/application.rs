//! Application model.
//!
//! # Responsibility
//! - Track the application's lifecycle and the windows it owns.
//! - Own the event queue its run loop drains.
//!
//! # Invariants
//! - State only moves forward: `Created -> Running -> Terminated`.
//! - `windows` lists exactly the open windows owned by this application,
//!   in creation order.
//! - The queue receiver is handed out once, to the single `run` call.

use crate::error::{CoreError, CoreResult};
use crate::event_loop::{EventQueue, LoopEvent, LoopProxy};
use crate::handle::WindowHandle;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Receiver;

/// Application lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    Created,
    Running,
    Terminated,
}

impl AppState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Terminated => "terminated",
        }
    }
}

/// The single running instance of the host program.
#[derive(Debug)]
pub struct Application {
    title: String,
    state: AppState,
    windows: Vec<WindowHandle>,
    windows_created: usize,
    frames: u64,
    queue: EventQueue,
}

impl Application {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            state: AppState::Created,
            windows: Vec::new(),
            windows_created: 0,
            frames: 0,
            queue: EventQueue::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    /// Open windows in creation order.
    pub fn windows(&self) -> &[WindowHandle] {
        &self.windows
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Whether every window this application ever owned has been closed.
    /// `false` for an application that never owned a window.
    pub fn all_windows_closed(&self) -> bool {
        self.windows_created > 0 && self.windows.is_empty()
    }

    /// Returns a sender onto this application's event queue.
    pub fn proxy(&self) -> LoopProxy {
        self.queue.proxy()
    }

    pub(crate) fn ensure_accepts_windows(&self) -> CoreResult<()> {
        match self.state {
            AppState::Created | AppState::Running => Ok(()),
            AppState::Terminated => Err(CoreError::invalid_state(
                "create_window",
                self.state.as_str(),
            )),
        }
    }

    pub(crate) fn attach_window(&mut self, window: WindowHandle) {
        self.windows.push(window);
        self.windows_created += 1;
    }

    pub(crate) fn detach_window(&mut self, window: WindowHandle) -> bool {
        let before = self.windows.len();
        self.windows.retain(|candidate| *candidate != window);
        self.windows.len() != before
    }

    pub(crate) fn take_windows(&mut self) -> Vec<WindowHandle> {
        std::mem::take(&mut self.windows)
    }

    /// `Created -> Running`; hands the queue receiver to the caller.
    ///
    /// # Errors
    /// - `InvalidState` unless the application is in `Created`.
    pub(crate) fn begin_run(&mut self) -> CoreResult<Receiver<LoopEvent>> {
        if self.state != AppState::Created {
            return Err(CoreError::invalid_state("run", self.state.as_str()));
        }
        let receiver = self
            .queue
            .take_receiver()
            .ok_or_else(|| CoreError::invalid_state("run", self.state.as_str()))?;
        self.state = AppState::Running;
        Ok(receiver)
    }

    pub(crate) fn record_frame(&mut self) {
        self.frames += 1;
    }

    pub(crate) fn terminate(&mut self) {
        self.state = AppState::Terminated;
    }

    pub fn snapshot(&self) -> ApplicationSnapshot {
        ApplicationSnapshot {
            title: self.title.clone(),
            state: self.state,
            open_windows: self.windows.len(),
            windows_created: self.windows_created,
            frames: self.frames,
        }
    }
}

/// Serializable read-only view of one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSnapshot {
    pub title: String,
    pub state: AppState,
    pub open_windows: usize,
    pub windows_created: usize,
    pub frames: u64,
}

#[cfg(test)]
mod tests {
    use super::{AppState, Application};
    use crate::error::CoreError;

    #[test]
    fn begin_run_is_single_shot() {
        let mut app = Application::new("demo");
        app.begin_run().expect("first run");
        assert_eq!(app.state(), AppState::Running);

        let err = app.begin_run().expect_err("second run");
        assert!(matches!(err, CoreError::InvalidState { .. }));
    }

    #[test]
    fn terminated_application_rejects_windows() {
        let mut app = Application::new("demo");
        app.terminate();
        assert!(matches!(
            app.ensure_accepts_windows(),
            Err(CoreError::InvalidState { .. })
        ));
    }

    #[test]
    fn all_windows_closed_requires_at_least_one_window() {
        let app = Application::new("demo");
        assert!(!app.all_windows_closed());
    }
}
