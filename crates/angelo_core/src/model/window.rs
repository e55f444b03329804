//! Window model.
//!
//! # Invariants
//! - Width and height are positive and fixed at creation.
//! - State only moves forward: `Created -> Shown -> Closed` (or
//!   `Created -> Closed`).

use crate::error::{CoreError, CoreResult};
use crate::handle::ApplicationHandle;
use serde::{Deserialize, Serialize};

/// Window lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
    Created,
    Shown,
    Closed,
}

impl WindowState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Shown => "shown",
            Self::Closed => "closed",
        }
    }
}

/// Validated creation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowSpec {
    width: u32,
    height: u32,
    title: String,
}

impl WindowSpec {
    /// Validates raw boundary geometry.
    ///
    /// # Errors
    /// - `InvalidArgument` when `width` or `height` is zero or negative.
    pub fn new(width: i32, height: i32, title: impl Into<String>) -> CoreResult<Self> {
        let width = positive_dimension("width", width)?;
        let height = positive_dimension("height", height)?;
        Ok(Self {
            width,
            height,
            title: title.into(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

fn positive_dimension(name: &str, value: i32) -> CoreResult<u32> {
    match u32::try_from(value) {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(CoreError::InvalidArgument(format!(
            "{name} must be positive, got {value}"
        ))),
    }
}

/// One on-screen surface owned by an application.
#[derive(Debug)]
pub struct Window {
    spec: WindowSpec,
    owner: ApplicationHandle,
    state: WindowState,
}

impl Window {
    pub fn new(spec: WindowSpec, owner: ApplicationHandle) -> Self {
        Self {
            spec,
            owner,
            state: WindowState::Created,
        }
    }

    pub fn spec(&self) -> &WindowSpec {
        &self.spec
    }

    pub fn title(&self) -> &str {
        self.spec.title()
    }

    pub fn owner(&self) -> ApplicationHandle {
        self.owner
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    /// Maps the window. Returns `true` when the state changed.
    ///
    /// # Errors
    /// - `InvalidState` when the window is already closed.
    pub fn show(&mut self) -> CoreResult<bool> {
        match self.state {
            WindowState::Created => {
                self.state = WindowState::Shown;
                Ok(true)
            }
            WindowState::Shown => Ok(false),
            WindowState::Closed => Err(CoreError::invalid_state("show", self.state.as_str())),
        }
    }

    /// Moves the window to its terminal state.
    pub fn close(&mut self) {
        self.state = WindowState::Closed;
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            title: self.spec.title.clone(),
            width: self.spec.width,
            height: self.spec.height,
            state: self.state,
        }
    }
}

/// Serializable read-only view of one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub state: WindowState,
}
