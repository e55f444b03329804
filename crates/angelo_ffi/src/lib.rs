//! C ABI for the Angelo application/window runtime.
//!
//! # Responsibility
//! - Export `create_app`, `create_window`, `run_app` and the supporting
//!   lifecycle calls with fixed-layout, C-compatible signatures.
//! - Own the process-wide host the exports operate on.
//!
//! # Invariants
//! - No export unwinds across the boundary.
//! - Creation results cross the boundary only as `HandleOpt`.
//!
//! # See also
//! - include/angelo.h

#[cfg(not(target_pointer_width = "64"))]
compile_error!("angelo_ffi requires 64-bit pointers: handles carry a 64-bit generational key");

pub mod api;
mod host;
pub mod option;

pub use api::*;
pub use option::{AppHandleOpt, HandleOpt, WindowHandleOpt};
