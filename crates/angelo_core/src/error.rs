//! Core error taxonomy shared by registry, runtime and run loop.
//!
//! # Responsibility
//! - Classify every failure into one of four stable categories.
//! - Provide the integer status mapping used at the C boundary.
//!
//! # Invariants
//! - Status codes are stable; `0` is reserved for success.

use crate::backend::BackendError;
use crate::handle::ResourceKind;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CoreResult<T> = Result<T, CoreError>;

/// Status returned across the boundary on success.
pub const STATUS_OK: i32 = 0;
/// Status returned when a panic was caught at the boundary.
pub const STATUS_PANIC: i32 = -5;

/// Failure categories for lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Handle is absent, invalidated, or of the other kind.
    InvalidHandle { expected: ResourceKind },
    /// Operation is not legal in the resource's current lifecycle state.
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
    /// Caller-supplied value was rejected before any resource was touched.
    InvalidArgument(String),
    /// Underlying resource could not be allocated.
    CreationFailure(String),
}

impl CoreError {
    pub(crate) fn invalid_state(operation: &'static str, state: &'static str) -> Self {
        Self::InvalidState { operation, state }
    }

    /// Stable short code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidHandle { .. } => "invalid_handle",
            Self::InvalidState { .. } => "invalid_state",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::CreationFailure(_) => "creation_failure",
        }
    }

    /// Integer status for callers that only see an exit code.
    pub fn status_code(&self) -> i32 {
        match self {
            Self::InvalidHandle { .. } => -1,
            Self::InvalidState { .. } => -2,
            Self::InvalidArgument(_) => -3,
            Self::CreationFailure(_) => -4,
        }
    }
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHandle { expected } => write!(f, "invalid {expected} handle"),
            Self::InvalidState { operation, state } => {
                write!(f, "`{operation}` is not allowed in state `{state}`")
            }
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::CreationFailure(message) => write!(f, "creation failed: {message}"),
        }
    }
}

impl Error for CoreError {}

impl From<BackendError> for CoreError {
    fn from(value: BackendError) -> Self {
        Self::CreationFailure(value.to_string())
    }
}
