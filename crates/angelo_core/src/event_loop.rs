//! Event queue primitives for the blocking run loop.
//!
//! # Responsibility
//! - Carry quit/close/wake requests from any thread to the loop thread.
//! - Describe why a loop stopped.
//!
//! # Invariants
//! - Every application owns exactly one queue; its receiver is drained by at
//!   most one run loop.
//! - Posting never blocks.
//!
//! # See also
//! - `crate::host::Host::run_app` for the loop itself.

use crate::error::{CoreError, CoreResult};
use crate::handle::WindowHandle;
use serde::Serialize;
use std::sync::mpsc::{self, Receiver, Sender};

/// Requests understood by the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    /// Explicit quit request.
    Quit,
    /// Close one window owned by the running application.
    CloseWindow(WindowHandle),
    /// Wake the loop without any other effect.
    Wake,
}

/// Cloneable, thread-safe sender onto one application's queue.
#[derive(Debug, Clone)]
pub struct LoopProxy {
    sender: Sender<LoopEvent>,
}

impl LoopProxy {
    /// Posts an event.
    ///
    /// # Errors
    /// - `InvalidState` when the loop has already finished.
    pub fn send(&self, event: LoopEvent) -> CoreResult<()> {
        self.sender
            .send(event)
            .map_err(|_| CoreError::invalid_state("post_event", "terminated"))
    }

    pub fn quit(&self) -> CoreResult<()> {
        self.send(LoopEvent::Quit)
    }

    pub fn close_window(&self, window: WindowHandle) -> CoreResult<()> {
        self.send(LoopEvent::CloseWindow(window))
    }
}

#[derive(Debug)]
pub(crate) struct EventQueue {
    sender: Sender<LoopEvent>,
    receiver: Option<Receiver<LoopEvent>>,
}

impl EventQueue {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver: Some(receiver),
        }
    }

    pub(crate) fn proxy(&self) -> LoopProxy {
        LoopProxy {
            sender: self.sender.clone(),
        }
    }

    pub(crate) fn take_receiver(&mut self) -> Option<Receiver<LoopEvent>> {
        self.receiver.take()
    }
}

/// Why a run loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    QuitRequested,
    LastWindowClosed,
    FrameLimit,
}

impl StopReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::QuitRequested => "quit_requested",
            Self::LastWindowClosed => "last_window_closed",
            Self::FrameLimit => "frame_limit",
        }
    }
}

/// Result of one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Stop(StopReason),
}

/// Outcome of a completed `run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub reason: StopReason,
    pub frames: u64,
    /// Wall-clock time spent inside `run`, in microseconds.
    pub elapsed_micros: u64,
    pub exit_code: i32,
}
