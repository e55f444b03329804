//! Core application/window lifecycle for Angelo.
//! Owns the handle registry, lifecycle rules and the blocking run loop; the
//! C boundary lives in `angelo_ffi`.

pub mod backend;
pub mod config;
pub mod error;
pub mod event_loop;
pub mod handle;
pub mod host;
pub mod logging;
pub mod model;
pub mod runtime;

pub use backend::{Backend, BackendError, HeadlessBackend};
pub use config::RunLoopConfig;
pub use error::{CoreError, CoreResult, STATUS_OK, STATUS_PANIC};
pub use event_loop::{LoopEvent, LoopProxy, RunSummary, StopReason};
pub use handle::{ApplicationHandle, HandleRegistry, ResourceKind, TypedHandle, WindowHandle};
pub use host::Host;
pub use logging::{
    default_log_level, init_logging, init_logging_from_env, logging_status, LoggingError,
};
pub use model::application::{AppState, Application, ApplicationSnapshot};
pub use model::window::{Window, WindowSnapshot, WindowSpec, WindowState};
pub use runtime::Runtime;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
