//! Lock-protected runtime and the blocking run loop.
//!
//! # Responsibility
//! - Share one `Runtime` between the loop thread and any caller posting
//!   requests from other threads.
//! - Block the calling thread in `run_app` until a termination condition
//!   holds.
//!
//! # Invariants
//! - The runtime lock is never held while the loop waits for an event.
//! - A poisoned lock is recovered; runtime mutations are small enough that
//!   the state stays consistent across a panic.

use crate::backend::Backend;
use crate::error::{CoreError, CoreResult, STATUS_OK};
use crate::event_loop::{LoopControl, LoopEvent, RunSummary, StopReason};
use crate::handle::{ApplicationHandle, TypedHandle};
use crate::runtime::Runtime;
use log::{info, warn};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Thread-safe owner of a `Runtime`.
pub struct Host<B: Backend> {
    runtime: Mutex<Runtime<B>>,
}

impl<B: Backend> Host<B> {
    pub fn new(runtime: Runtime<B>) -> Self {
        Self {
            runtime: Mutex::new(runtime),
        }
    }

    /// Exclusive access for short, non-blocking operations.
    pub fn lock(&self) -> MutexGuard<'_, Runtime<B>> {
        self.runtime.lock().unwrap_or_else(|poisoned| {
            warn!("event=host_lock module=host status=recovered reason=poisoned");
            PoisonError::into_inner(poisoned)
        })
    }

    /// Runs `app`'s loop on the calling thread.
    ///
    /// The application ends in `Terminated` however the loop exits: cleanly,
    /// with an error from a loop step, or by unwinding.
    ///
    /// # Errors
    /// - `InvalidHandle` when `app` does not resolve; the call returns without
    ///   blocking.
    /// - `InvalidState` when `app` is not in `Created`.
    /// - Any error raised by a loop step, after the application terminated.
    pub fn run_app(&self, app: ApplicationHandle) -> CoreResult<RunSummary> {
        let started_at = Instant::now();
        let (receiver, tick) = {
            let mut runtime = self.lock();
            let receiver = runtime.begin_run(app)?;
            (receiver, runtime.config().tick)
        };

        let mut guard = RunGuard {
            host: self,
            app,
            armed: true,
        };
        let outcome = self.drive(app, &receiver, tick);
        guard.armed = false;

        let finished = self.lock().finish_run(app);
        let elapsed_micros = u64::try_from(started_at.elapsed().as_micros()).unwrap_or(u64::MAX);
        let (reason, frames) = match (outcome, finished) {
            (Ok(reason), Ok(frames)) => (reason, frames),
            (Err(err), _) | (Ok(_), Err(err)) => {
                warn!(
                    "event=app_run module=host status=error handle={:#x} error_code={} error={} elapsed_us={}",
                    app.to_raw(),
                    err.code(),
                    err,
                    elapsed_micros
                );
                return Err(err);
            }
        };

        info!(
            "event=app_run module=host status=ok handle={:#x} reason={} frames={} elapsed_us={}",
            app.to_raw(),
            reason.as_str(),
            frames,
            elapsed_micros
        );
        Ok(RunSummary {
            reason,
            frames,
            elapsed_micros,
            exit_code: STATUS_OK,
        })
    }

    fn drive(
        &self,
        app: ApplicationHandle,
        receiver: &Receiver<LoopEvent>,
        tick: Duration,
    ) -> CoreResult<StopReason> {
        loop {
            let event = match receiver.recv_timeout(tick) {
                Ok(event) => Some(event),
                Err(RecvTimeoutError::Timeout) => None,
                // The application holds a sender for as long as it is
                // registered, so this means it vanished mid-run.
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(CoreError::invalid_state("run", "queue_closed"));
                }
            };
            if let LoopControl::Stop(reason) = self.lock().step(app, event)? {
                return Ok(reason);
            }
        }
    }
}

/// Terminates the application if the loop unwinds before `finish_run`.
struct RunGuard<'a, B: Backend> {
    host: &'a Host<B>,
    app: ApplicationHandle,
    armed: bool,
}

impl<B: Backend> Drop for RunGuard<'_, B> {
    fn drop(&mut self) {
        if self.armed {
            self.host.lock().abandon_run(self.app);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Host;
    use crate::backend::{Backend, BackendError, HeadlessBackend};
    use crate::config::RunLoopConfig;
    use crate::error::CoreError;
    use crate::event_loop::StopReason;
    use crate::handle::WindowHandle;
    use crate::model::application::AppState;
    use crate::model::window::WindowSpec;
    use crate::runtime::Runtime;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::time::Duration;

    struct PanicOnClose;

    impl Backend for PanicOnClose {
        fn name(&self) -> &'static str {
            "panic_on_close"
        }

        fn initialize(&mut self, _app_title: &str) -> Result<(), BackendError> {
            Ok(())
        }

        fn open_window(
            &mut self,
            _window: WindowHandle,
            _spec: &WindowSpec,
        ) -> Result<(), BackendError> {
            Ok(())
        }

        fn show_window(&mut self, _window: WindowHandle) {}

        fn close_window(&mut self, _window: WindowHandle) {
            panic!("surface teardown failed");
        }
    }

    fn host_with(config: RunLoopConfig) -> Host<HeadlessBackend> {
        Host::new(Runtime::with_config(HeadlessBackend::new(), config))
    }

    #[test]
    fn frame_limit_stops_loop() {
        let host = host_with(RunLoopConfig {
            tick: Duration::from_millis(1),
            max_frames: Some(3),
            ..RunLoopConfig::default()
        });
        let app = host.lock().create_app("demo").expect("app");

        let summary = host.run_app(app).expect("run");
        assert_eq!(summary.reason, StopReason::FrameLimit);
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.exit_code, 0);
    }

    #[test]
    fn quit_posted_before_run_is_honored() {
        let host = host_with(RunLoopConfig::default());
        let app = host.lock().create_app("demo").expect("app");
        host.lock().request_quit(app).expect("quit");

        let summary = host.run_app(app).expect("run");
        assert_eq!(summary.reason, StopReason::QuitRequested);
        assert_eq!(summary.frames, 1);
    }

    #[test]
    fn summary_reports_elapsed_time() {
        let host = host_with(RunLoopConfig {
            tick: Duration::from_millis(2),
            max_frames: Some(2),
            ..RunLoopConfig::default()
        });
        let app = host.lock().create_app("demo").expect("app");

        let summary = host.run_app(app).expect("run");
        assert!(summary.elapsed_micros >= 2_000);
    }

    #[test]
    fn unwinding_loop_still_terminates_the_application() {
        let host = Host::new(Runtime::new(PanicOnClose));
        let app = host.lock().create_app("demo").expect("app");
        let spec = |title: &str| WindowSpec::new(320, 240, title).expect("spec");
        let first = host.lock().create_window(app, spec("first")).expect("w1");
        let second = host.lock().create_window(app, spec("second")).expect("w2");
        host.lock()
            .proxy(app)
            .expect("proxy")
            .close_window(first)
            .expect("post");

        let outcome = catch_unwind(AssertUnwindSafe(|| host.run_app(app)));
        assert!(outcome.is_err());

        assert_eq!(
            host.lock().app_snapshot(app).expect("app").state,
            AppState::Terminated
        );
        assert!(matches!(
            host.lock().window_snapshot(second),
            Err(CoreError::InvalidHandle { .. })
        ));
        assert!(matches!(
            host.run_app(app),
            Err(CoreError::InvalidState { .. })
        ));
        host.lock().destroy_app(app).expect("destroy after failed run");
        host.lock().create_app("again").expect("singleton slot freed");
    }
}
