use angelo_core::{
    AppState, ApplicationHandle, CoreError, HeadlessBackend, Runtime, TypedHandle, WindowHandle,
    WindowSpec,
};

fn runtime() -> Runtime<HeadlessBackend> {
    Runtime::new(HeadlessBackend::new())
}

#[test]
fn create_app_then_window_succeeds_for_valid_input() {
    let cases = [(1, 1, ""), (800, 600, "My Application"), (3840, 2160, "ünïcödé")];
    for (width, height, title) in cases {
        let mut runtime = runtime();
        let app = runtime.create_app(title).unwrap();
        let spec = WindowSpec::new(width, height, title).unwrap();
        let window = runtime.create_window(app, spec).unwrap();

        let snapshot = runtime.window_snapshot(window).unwrap();
        assert_eq!((snapshot.width as i32, snapshot.height as i32), (width, height));
        assert_eq!(snapshot.title, title);
        assert_eq!(runtime.app_snapshot(app).unwrap().open_windows, 1);
    }
}

#[test]
fn non_positive_dimensions_never_register_a_window() {
    let mut runtime = runtime();
    let app = runtime.create_app("X").unwrap();
    let before = runtime.registry().len();

    for (width, height) in [(0, 600), (800, 0), (-800, 600), (0, 0)] {
        let err = WindowSpec::new(width, height, "X")
            .and_then(|spec| runtime.create_window(app, spec))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }
    assert_eq!(runtime.registry().len(), before);
}

#[test]
fn app_and_window_handles_never_collide_or_cross_resolve() {
    let mut runtime = runtime();
    let app = runtime.create_app("demo").unwrap();
    let windows = (0..8)
        .map(|_| {
            runtime
                .create_window(app, WindowSpec::new(10, 10, "w").unwrap())
                .unwrap()
        })
        .collect::<Vec<_>>();

    for window in &windows {
        assert_ne!(window.to_raw(), app.to_raw());
        let as_app = ApplicationHandle::from_raw(window.to_raw()).unwrap();
        assert!(matches!(
            runtime.app_snapshot(as_app),
            Err(CoreError::InvalidHandle { .. })
        ));
    }
    let as_window = WindowHandle::from_raw(app.to_raw()).unwrap();
    assert!(runtime.window_snapshot(as_window).is_err());
    assert!(runtime.close_window(as_window).is_err());
    assert_eq!(runtime.app_snapshot(app).unwrap().state, AppState::Created);
}

#[test]
fn stale_window_handle_does_not_alias_reused_slot() {
    let mut runtime = runtime();
    let app = runtime.create_app("demo").unwrap();
    let stale = runtime
        .create_window(app, WindowSpec::new(10, 10, "old").unwrap())
        .unwrap();
    runtime.close_window(stale).unwrap();

    let fresh = runtime
        .create_window(app, WindowSpec::new(20, 20, "new").unwrap())
        .unwrap();
    assert_ne!(stale.to_raw(), fresh.to_raw());
    assert!(runtime.window_snapshot(stale).is_err());
    assert_eq!(runtime.window_snapshot(fresh).unwrap().title, "new");
}

#[test]
fn windows_keep_creation_order_in_owner() {
    let mut runtime = runtime();
    let app = runtime.create_app("demo").unwrap();
    let first = runtime
        .create_window(app, WindowSpec::new(1, 1, "a").unwrap())
        .unwrap();
    let second = runtime
        .create_window(app, WindowSpec::new(1, 1, "b").unwrap())
        .unwrap();
    let third = runtime
        .create_window(app, WindowSpec::new(1, 1, "c").unwrap())
        .unwrap();
    runtime.close_window(second).unwrap();

    let owned = runtime
        .registry()
        .applications()
        .map(|(_, app)| app.windows().to_vec())
        .next()
        .unwrap();
    assert_eq!(owned, vec![first, third]);
}
