//! Exported C functions.
//!
//! # Responsibility
//! - Validate raw pointers and handle values before they reach the core.
//! - Map every outcome to `HandleOpt` or an integer status.
//!
//! # Invariants
//! - Exports never panic across the boundary; a caught panic becomes
//!   `HandleOpt::NONE` or `STATUS_PANIC`.
//! - Status codes: `0` ok, `-1` invalid handle, `-2` invalid state,
//!   `-3` invalid argument, `-4` creation failure, `-5` panic.

use crate::host::HOST;
use crate::option::{decode, AppHandleOpt, HandleOpt, WindowHandleOpt};
use angelo_core::{
    init_logging, ApplicationHandle, CoreError, CoreResult, TypedHandle, WindowHandle, WindowSpec,
    STATUS_OK, STATUS_PANIC,
};
use log::{error, warn};
use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// NUL-terminated crate version.
static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

/// Creates the process application.
///
/// # FFI contract
/// - Returns `is_some = false` when `title` is null or not UTF-8, when an
///   application already exists, or when the platform cannot initialize.
/// - Non-blocking.
///
/// # Safety
/// `title` must be null or point to a NUL-terminated string that stays
/// valid for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn create_app(title: *const c_char) -> AppHandleOpt {
    handle_boundary("create_app", || {
        let title = unsafe { read_c_str(title, "title") }?;
        HOST.lock().create_app(&title)
    })
}

/// Creates a window owned by `app`.
///
/// # FFI contract
/// - Returns `is_some = false` when `app` is not a live application, when
///   `width` or `height` is not positive, when `title` is null or not UTF-8,
///   or when the platform rejects the window. Nothing is registered then.
/// - The window is shown when `app`'s run loop starts, or right away if the
///   loop is already running.
///
/// # Safety
/// `title` must be null or point to a NUL-terminated string that stays
/// valid for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn create_window(
    app: usize,
    width: c_int,
    height: c_int,
    title: *const c_char,
) -> WindowHandleOpt {
    handle_boundary("create_window", || {
        let owner = decode::<ApplicationHandle>(app)?;
        let title = unsafe { read_c_str(title, "title") }?;
        let spec = WindowSpec::new(width, height, title)?;
        HOST.lock().create_window(owner, spec)
    })
}

/// Runs `app`'s loop on the calling thread.
///
/// # FFI contract
/// - Blocks until a quit request or until every window has been closed,
///   then returns `0`.
/// - Returns a negative status without blocking when `app` is not a live
///   application (`-1`) or has already run (`-2`).
#[no_mangle]
pub extern "C" fn run_app(app: usize) -> c_int {
    status_boundary("run_app", || {
        let app = decode::<ApplicationHandle>(app)?;
        HOST.run_app(app).map(|summary| summary.exit_code)
    })
}

/// Asks `app`'s loop to stop. Callable from any thread.
#[no_mangle]
pub extern "C" fn quit_app(app: usize) -> c_int {
    status_boundary("quit_app", || {
        let app = decode::<ApplicationHandle>(app)?;
        HOST.lock().request_quit(app)?;
        Ok(STATUS_OK)
    })
}

/// Invalidates `app` and every window it owns. Rejected with `-2` while the
/// loop is running.
#[no_mangle]
pub extern "C" fn destroy_app(app: usize) -> c_int {
    status_boundary("destroy_app", || {
        let app = decode::<ApplicationHandle>(app)?;
        HOST.lock().destroy_app(app)?;
        Ok(STATUS_OK)
    })
}

/// Shows `window`. Showing a shown window is a no-op.
#[no_mangle]
pub extern "C" fn show_window(window: usize) -> c_int {
    status_boundary("show_window", || {
        let window = decode::<WindowHandle>(window)?;
        HOST.lock().show_window(window)?;
        Ok(STATUS_OK)
    })
}

/// Closes `window` and invalidates its handle.
#[no_mangle]
pub extern "C" fn close_window(window: usize) -> c_int {
    status_boundary("close_window", || {
        let window = decode::<WindowHandle>(window)?;
        HOST.lock().close_window(window)?;
        Ok(STATUS_OK)
    })
}

/// Starts file logging.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error`, case-insensitive.
/// - `log_dir`: absolute directory for rolling log files.
/// - Idempotent for the same pair; returns `-3` for bad input or an attempt
///   to reconfigure.
///
/// # Safety
/// Both pointers must be null or point to NUL-terminated strings that stay
/// valid for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn angelo_init_logging(
    level: *const c_char,
    log_dir: *const c_char,
) -> c_int {
    status_boundary("init_logging", || {
        let level = unsafe { read_c_str(level, "level") }?;
        let log_dir = unsafe { read_c_str(log_dir, "log_dir") }?;
        init_logging(&level, &log_dir)
            .map_err(|err| CoreError::InvalidArgument(err.to_string()))?;
        Ok(STATUS_OK)
    })
}

/// Library version as a static NUL-terminated string. Never null; the caller
/// must not free it.
#[no_mangle]
pub extern "C" fn angelo_version() -> *const c_char {
    VERSION.as_ptr().cast::<c_char>()
}

/// Reads a borrowed C string into an owned `String`.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string valid for reads.
unsafe fn read_c_str(ptr: *const c_char, name: &str) -> CoreResult<String> {
    if ptr.is_null() {
        return Err(CoreError::InvalidArgument(format!("{name} is null")));
    }
    let raw = unsafe { CStr::from_ptr(ptr) };
    raw.to_str()
        .map(str::to_owned)
        .map_err(|_| CoreError::InvalidArgument(format!("{name} is not valid UTF-8")))
}

fn handle_boundary<H: TypedHandle>(
    operation: &'static str,
    f: impl FnOnce() -> CoreResult<H>,
) -> HandleOpt {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => HandleOpt::from_result(result.inspect_err(|err| {
            warn!(
                "event={} module=ffi status=error error_code={} error={}",
                operation,
                err.code(),
                err
            );
        })),
        Err(_) => {
            error!("event={operation} module=ffi status=error error_code=panic");
            HandleOpt::NONE
        }
    }
}

fn status_boundary(operation: &'static str, f: impl FnOnce() -> CoreResult<c_int>) -> c_int {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(status)) => status,
        Ok(Err(err)) => {
            warn!(
                "event={} module=ffi status=error error_code={} error={}",
                operation,
                err.code(),
                err
            );
            err.status_code()
        }
        Err(_) => {
            error!("event={operation} module=ffi status=error error_code=panic");
            STATUS_PANIC
        }
    }
}
