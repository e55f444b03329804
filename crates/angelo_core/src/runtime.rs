//! Application and window lifecycle operations over the handle registry.
//!
//! # Responsibility
//! - Create, show, close and destroy resources while keeping ownership links
//!   between applications and windows consistent.
//! - Drive the per-iteration step of the run loop.
//!
//! # Invariants
//! - At most one application is registered at a time.
//! - The backend is initialized once, on the first successful application.
//! - Failed creation leaves the registry exactly as it was.
//! - Terminating or destroying an application invalidates every window it
//!   owned.

use crate::backend::Backend;
use crate::config::RunLoopConfig;
use crate::error::{CoreError, CoreResult};
use crate::event_loop::{LoopControl, LoopEvent, LoopProxy, StopReason};
use crate::handle::{ApplicationHandle, HandleRegistry, TypedHandle, WindowHandle};
use crate::model::application::{AppState, Application, ApplicationSnapshot};
use crate::model::window::{Window, WindowSnapshot, WindowSpec, WindowState};
use log::{error, info, warn};
use std::sync::mpsc::Receiver;

/// Lifecycle manager. Single-threaded; see `crate::host::Host` for the
/// shared, lock-protected form.
pub struct Runtime<B: Backend> {
    registry: HandleRegistry,
    backend: B,
    backend_ready: bool,
    config: RunLoopConfig,
}

impl<B: Backend> Runtime<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, RunLoopConfig::default())
    }

    pub fn with_config(backend: B, config: RunLoopConfig) -> Self {
        Self {
            registry: HandleRegistry::new(),
            backend,
            backend_ready: false,
            config,
        }
    }

    pub fn registry(&self) -> &HandleRegistry {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &RunLoopConfig {
        &self.config
    }

    /// Creates the process application in state `Created`.
    ///
    /// # Errors
    /// - `CreationFailure` when an application is already registered or the
    ///   backend fails to initialize.
    pub fn create_app(&mut self, title: &str) -> CoreResult<ApplicationHandle> {
        if self.registry.applications().next().is_some() {
            let err = CoreError::CreationFailure("an application already exists".to_string());
            warn!(
                "event=app_create module=runtime status=error error_code={}",
                err.code()
            );
            return Err(err);
        }

        if !self.backend_ready {
            if let Err(err) = self.backend.initialize(title) {
                error!(
                    "event=backend_init module=runtime status=error backend={} error={}",
                    self.backend.name(),
                    err
                );
                return Err(err.into());
            }
            self.backend_ready = true;
            info!(
                "event=backend_init module=runtime status=ok backend={}",
                self.backend.name()
            );
        }

        let handle = self.registry.allocate(Application::new(title));
        info!(
            "event=app_create module=runtime status=ok handle={:#x} title_len={}",
            handle.to_raw(),
            title.len()
        );
        Ok(handle)
    }

    /// Creates a window owned by `owner`.
    ///
    /// Windows created while the owner is running are shown immediately;
    /// otherwise they stay `Created` until `show_window` or loop start.
    ///
    /// # Errors
    /// - `InvalidHandle` when `owner` does not resolve.
    /// - `InvalidState` when `owner` has terminated.
    /// - `CreationFailure` when the backend rejects the surface.
    pub fn create_window(
        &mut self,
        owner: ApplicationHandle,
        spec: WindowSpec,
    ) -> CoreResult<WindowHandle> {
        let owner_state = {
            let app = self.registry.get::<Application>(owner)?;
            app.ensure_accepts_windows()?;
            app.state()
        };

        let handle = self.registry.allocate(Window::new(spec, owner));
        let Self {
            registry, backend, ..
        } = &mut *self;
        let opened = backend.open_window(handle, registry.get::<Window>(handle)?.spec());
        if let Err(err) = opened {
            // Roll back so a rejected window leaves no registry entry.
            if let Err(rollback) = self.registry.invalidate::<Window>(handle) {
                error!(
                    "event=window_create module=runtime status=error stage=rollback handle={:#x} error={}",
                    handle.to_raw(),
                    rollback
                );
            }
            warn!(
                "event=window_create module=runtime status=error error_code=creation_failure error={}",
                err
            );
            return Err(err.into());
        }

        self.registry.get_mut::<Application>(owner)?.attach_window(handle);
        info!(
            "event=window_create module=runtime status=ok handle={:#x} owner={:#x}",
            handle.to_raw(),
            owner.to_raw()
        );

        if owner_state == AppState::Running {
            self.show_window(handle)?;
        }
        Ok(handle)
    }

    /// Shows a window. Showing a shown window is a no-op.
    pub fn show_window(&mut self, window: WindowHandle) -> CoreResult<()> {
        if self.registry.get_mut::<Window>(window)?.show()? {
            self.backend.show_window(window);
            info!(
                "event=window_show module=runtime status=ok handle={:#x}",
                window.to_raw()
            );
        }
        Ok(())
    }

    /// Closes a window and invalidates its handle.
    pub fn close_window(&mut self, window: WindowHandle) -> CoreResult<WindowSnapshot> {
        let mut closed = self.registry.invalidate::<Window>(window)?;
        closed.close();
        if let Ok(owner) = self.registry.get_mut::<Application>(closed.owner()) {
            owner.detach_window(window);
        }
        self.backend.close_window(window);
        info!(
            "event=window_close module=runtime status=ok handle={:#x}",
            window.to_raw()
        );
        Ok(closed.snapshot())
    }

    /// Sender onto the application's run loop queue.
    pub fn proxy(&self, app: ApplicationHandle) -> CoreResult<LoopProxy> {
        Ok(self.registry.get::<Application>(app)?.proxy())
    }

    /// Posts a quit request to the application's loop.
    ///
    /// # Errors
    /// - `InvalidState` when the application already terminated.
    pub fn request_quit(&self, app: ApplicationHandle) -> CoreResult<()> {
        let application = self.registry.get::<Application>(app)?;
        if application.state() == AppState::Terminated {
            return Err(CoreError::invalid_state("quit", application.state().as_str()));
        }
        application.proxy().quit()?;
        info!(
            "event=app_quit_request module=runtime status=ok handle={:#x}",
            app.to_raw()
        );
        Ok(())
    }

    /// Invalidates the application and every window it owns.
    ///
    /// # Errors
    /// - `InvalidState` while the application's loop is running.
    pub fn destroy_app(&mut self, app: ApplicationHandle) -> CoreResult<()> {
        let state = self.registry.get::<Application>(app)?.state();
        if state == AppState::Running {
            return Err(CoreError::invalid_state("destroy", state.as_str()));
        }
        let closed = self.close_owned_windows(app)?;
        self.registry.invalidate::<Application>(app)?;
        info!(
            "event=app_destroy module=runtime status=ok handle={:#x} windows_closed={}",
            app.to_raw(),
            closed
        );
        Ok(())
    }

    pub fn app_snapshot(&self, app: ApplicationHandle) -> CoreResult<ApplicationSnapshot> {
        Ok(self.registry.get::<Application>(app)?.snapshot())
    }

    pub fn window_snapshot(&self, window: WindowHandle) -> CoreResult<WindowSnapshot> {
        Ok(self.registry.get::<Window>(window)?.snapshot())
    }

    /// `Created -> Running`; maps every window still in `Created`.
    pub(crate) fn begin_run(&mut self, app: ApplicationHandle) -> CoreResult<Receiver<LoopEvent>> {
        let application = self.registry.get_mut::<Application>(app)?;
        let receiver = application.begin_run()?;
        let pending = application.windows().to_vec();
        for window in pending {
            if self.registry.get::<Window>(window)?.state() == WindowState::Created {
                self.show_window(window)?;
            }
        }
        info!(
            "event=app_run module=runtime status=start handle={:#x}",
            app.to_raw()
        );
        Ok(receiver)
    }

    /// One loop iteration: applies `event` (if any) and evaluates the
    /// termination conditions.
    pub(crate) fn step(
        &mut self,
        app: ApplicationHandle,
        event: Option<LoopEvent>,
    ) -> CoreResult<LoopControl> {
        self.registry.get_mut::<Application>(app)?.record_frame();

        match event {
            Some(LoopEvent::Quit) => return Ok(LoopControl::Stop(StopReason::QuitRequested)),
            Some(LoopEvent::CloseWindow(window)) => {
                let owned = self
                    .registry
                    .get::<Application>(app)?
                    .windows()
                    .contains(&window);
                if owned {
                    self.close_window(window)?;
                } else {
                    warn!(
                        "event=window_close module=runtime status=ignored handle={:#x} reason=not_owned",
                        window.to_raw()
                    );
                }
            }
            Some(LoopEvent::Wake) | None => {}
        }

        let application = self.registry.get::<Application>(app)?;
        if self.config.quit_on_last_window_closed && application.all_windows_closed() {
            return Ok(LoopControl::Stop(StopReason::LastWindowClosed));
        }
        if let Some(limit) = self.config.max_frames {
            if application.frames() >= limit {
                return Ok(LoopControl::Stop(StopReason::FrameLimit));
            }
        }
        Ok(LoopControl::Continue)
    }

    /// `Running -> Terminated`; closes every remaining window.
    pub(crate) fn finish_run(&mut self, app: ApplicationHandle) -> CoreResult<u64> {
        self.close_owned_windows(app)?;
        let application = self.registry.get_mut::<Application>(app)?;
        application.terminate();
        Ok(application.frames())
    }

    /// Forces `Terminated` after a run loop unwound.
    ///
    /// Remaining windows are invalidated without calling into the backend,
    /// whose state is unknown after the panic.
    pub(crate) fn abandon_run(&mut self, app: ApplicationHandle) {
        let windows = match self.registry.get_mut::<Application>(app) {
            Ok(application) => {
                application.terminate();
                application.take_windows()
            }
            Err(err) => {
                error!(
                    "event=app_run module=runtime status=error stage=abandon handle={:#x} error={}",
                    app.to_raw(),
                    err
                );
                return;
            }
        };
        let count = windows.len();
        for window in windows {
            if let Err(err) = self.registry.invalidate::<Window>(window) {
                warn!(
                    "event=window_close module=runtime status=error handle={:#x} error={}",
                    window.to_raw(),
                    err
                );
            }
        }
        error!(
            "event=app_run module=runtime status=abandoned handle={:#x} windows_dropped={}",
            app.to_raw(),
            count
        );
    }

    fn close_owned_windows(&mut self, app: ApplicationHandle) -> CoreResult<usize> {
        let windows = self.registry.get_mut::<Application>(app)?.take_windows();
        let count = windows.len();
        for window in windows {
            if let Err(err) = self.close_window(window) {
                warn!(
                    "event=window_close module=runtime status=error handle={:#x} error={}",
                    window.to_raw(),
                    err
                );
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::Runtime;
    use crate::backend::{Backend, BackendError, HeadlessBackend};
    use crate::error::CoreError;
    use crate::handle::{ApplicationHandle, TypedHandle, WindowHandle};
    use crate::model::application::AppState;
    use crate::model::window::{WindowSpec, WindowState};

    #[derive(Default)]
    struct RejectingBackend {
        fail_init: bool,
        init_calls: usize,
    }

    impl Backend for RejectingBackend {
        fn name(&self) -> &'static str {
            "rejecting"
        }

        fn initialize(&mut self, _app_title: &str) -> Result<(), BackendError> {
            self.init_calls += 1;
            if self.fail_init {
                return Err(BackendError::new("no display"));
            }
            Ok(())
        }

        fn open_window(
            &mut self,
            _window: WindowHandle,
            _spec: &WindowSpec,
        ) -> Result<(), BackendError> {
            Err(BackendError::new("surface rejected"))
        }

        fn show_window(&mut self, _window: WindowHandle) {}

        fn close_window(&mut self, _window: WindowHandle) {}
    }

    fn spec(width: i32, height: i32) -> WindowSpec {
        WindowSpec::new(width, height, "My Application").expect("valid spec")
    }

    #[test]
    fn second_application_is_a_creation_failure() {
        let mut runtime = Runtime::new(HeadlessBackend::new());
        runtime.create_app("first").expect("first app");
        let err = runtime.create_app("second").expect_err("singleton");
        assert!(matches!(err, CoreError::CreationFailure(_)));
        assert_eq!(runtime.registry().len(), 1);
    }

    #[test]
    fn backend_init_failure_surfaces_and_is_retried() {
        let mut runtime = Runtime::new(RejectingBackend {
            fail_init: true,
            ..RejectingBackend::default()
        });
        let err = runtime.create_app("demo").expect_err("init fails");
        assert!(matches!(err, CoreError::CreationFailure(_)));
        assert!(runtime.registry().is_empty());
        let _ = runtime.create_app("demo");
        assert_eq!(runtime.backend().init_calls, 2);
    }

    #[test]
    fn backend_is_initialized_once_across_app_generations() {
        let mut runtime = Runtime::new(RejectingBackend::default());
        let first = runtime.create_app("first").expect("first");
        runtime.destroy_app(first).expect("destroy");
        runtime.create_app("second").expect("second");
        assert_eq!(runtime.backend().init_calls, 1);
    }

    #[test]
    fn rejected_surface_leaves_registry_unchanged() {
        let mut runtime = Runtime::new(RejectingBackend::default());
        let app = runtime.create_app("demo").expect("app");
        let before = runtime.registry().len();

        let err = runtime.create_window(app, spec(800, 600)).expect_err("rejected");
        assert!(matches!(err, CoreError::CreationFailure(_)));
        assert_eq!(runtime.registry().len(), before);
        assert!(runtime.app_snapshot(app).expect("app").open_windows == 0);
    }

    #[test]
    fn window_requires_live_owner() {
        let mut runtime = Runtime::new(HeadlessBackend::new());
        let app = runtime.create_app("demo").expect("app");
        runtime.destroy_app(app).expect("destroy");

        let err = runtime.create_window(app, spec(800, 600)).expect_err("dead owner");
        assert!(matches!(err, CoreError::InvalidHandle { .. }));

        let forged = ApplicationHandle::from_raw((1 << 32) | 42).expect("decodes");
        assert!(runtime.create_window(forged, spec(800, 600)).is_err());
    }

    #[test]
    fn windows_start_created_and_show_is_idempotent() {
        let mut runtime = Runtime::new(HeadlessBackend::new());
        let app = runtime.create_app("demo").expect("app");
        let window = runtime.create_window(app, spec(800, 600)).expect("window");
        assert_eq!(
            runtime.window_snapshot(window).expect("snapshot").state,
            WindowState::Created
        );

        runtime.show_window(window).expect("show");
        runtime.show_window(window).expect("show again");
        assert_eq!(
            runtime.window_snapshot(window).expect("snapshot").state,
            WindowState::Shown
        );
    }

    #[test]
    fn close_window_invalidates_and_detaches() {
        let mut runtime = Runtime::new(HeadlessBackend::new());
        let app = runtime.create_app("demo").expect("app");
        let window = runtime.create_window(app, spec(800, 600)).expect("window");
        assert_eq!(runtime.backend().open_windows(), 1);

        let closed = runtime.close_window(window).expect("close");
        assert_eq!(closed.state, WindowState::Closed);
        assert!(runtime.window_snapshot(window).is_err());
        assert!(runtime.close_window(window).is_err());
        assert_eq!(runtime.app_snapshot(app).expect("app").open_windows, 0);
        assert_eq!(runtime.backend().open_windows(), 0);
    }

    #[test]
    fn destroy_cascades_to_windows_and_frees_singleton() {
        let mut runtime = Runtime::new(HeadlessBackend::new());
        let app = runtime.create_app("demo").expect("app");
        let first = runtime.create_window(app, spec(800, 600)).expect("w1");
        let second = runtime.create_window(app, spec(640, 480)).expect("w2");

        runtime.destroy_app(app).expect("destroy");
        assert!(runtime.registry().is_empty());
        for window in [first, second] {
            assert!(matches!(
                runtime.window_snapshot(window),
                Err(CoreError::InvalidHandle { .. })
            ));
        }
        assert!(runtime.app_snapshot(app).is_err());
        runtime.create_app("again").expect("singleton slot freed");
    }

    #[test]
    fn quit_after_termination_is_invalid_state() {
        let mut runtime = Runtime::new(HeadlessBackend::new());
        let app = runtime.create_app("demo").expect("app");
        let _receiver = runtime.begin_run(app).expect("run");
        runtime.finish_run(app).expect("finish");
        assert_eq!(
            runtime.app_snapshot(app).expect("app").state,
            AppState::Terminated
        );
        assert!(matches!(
            runtime.request_quit(app),
            Err(CoreError::InvalidState { .. })
        ));
    }

    #[test]
    fn destroy_while_running_is_rejected() {
        let mut runtime = Runtime::new(HeadlessBackend::new());
        let app = runtime.create_app("demo").expect("app");
        let _receiver = runtime.begin_run(app).expect("run");
        assert!(matches!(
            runtime.destroy_app(app),
            Err(CoreError::InvalidState { .. })
        ));
    }
}
