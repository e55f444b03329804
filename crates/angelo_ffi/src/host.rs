//! Process-wide host behind the exported functions.

use angelo_core::{init_logging_from_env, HeadlessBackend, Host, RunLoopConfig, Runtime};
use log::info;
use once_cell::sync::Lazy;

/// Initialized on first use by any export. Logging starts here as well when
/// `ANGELO_LOG_DIR` is set.
pub(crate) static HOST: Lazy<Host<HeadlessBackend>> = Lazy::new(|| {
    if let Err(err) = init_logging_from_env() {
        // No logger to report through yet.
        eprintln!("angelo: logging disabled: {err}");
    }
    let config = RunLoopConfig::from_env();
    info!(
        "event=host_init module=ffi status=ok tick_ms={} quit_on_last_window_closed={} max_frames={:?}",
        config.tick.as_millis(),
        config.quit_on_last_window_closed,
        config.max_frames
    );
    Host::new(Runtime::with_config(HeadlessBackend::new(), config))
});
