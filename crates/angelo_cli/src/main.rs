//! CLI smoke entry point.
//!
//! # Responsibility
//! - Drive one application session through `angelo_core` end to end.
//! - Print a deterministic JSON report for quick local sanity checks.

use angelo_core::{
    init_logging_from_env, CoreError, HeadlessBackend, Host, RunLoopConfig, Runtime, WindowSpec,
};
use clap::Parser;
use serde_json::json;
use std::process::ExitCode;

/// Runs one headless application session and prints a JSON report.
#[derive(Debug, Parser)]
#[command(name = "angelo_cli")]
#[command(about = "Headless application/window lifecycle smoke run", long_about = None)]
#[command(version)]
struct Args {
    /// Application and window title
    #[arg(short, long, default_value = "Angelo Test")]
    title: String,

    /// Window width in pixels
    #[arg(long, default_value_t = 800, allow_negative_numbers = true)]
    width: i32,

    /// Window height in pixels
    #[arg(long, default_value_t = 600, allow_negative_numbers = true)]
    height: i32,

    /// Frames to run before the loop stops on its own
    #[arg(short, long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    frames: u64,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = init_logging_from_env() {
        eprintln!("logging disabled: {err}");
    }

    match run_session(&args) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("session failed: {err}");
            ExitCode::from(err.status_code().unsigned_abs() as u8)
        }
    }
}

fn run_session(args: &Args) -> Result<serde_json::Value, CoreError> {
    // Headless run: bound the loop by frames since nothing will post a quit.
    let config = RunLoopConfig {
        max_frames: Some(args.frames),
        ..RunLoopConfig::from_env()
    };
    let host = Host::new(Runtime::with_config(HeadlessBackend::new(), config));

    let spec = WindowSpec::new(args.width, args.height, &args.title)?;
    let app = host.lock().create_app(&args.title)?;
    let window = host.lock().create_window(app, spec)?;
    let window_before = host.lock().window_snapshot(window)?;
    let summary = host.run_app(app)?;
    let app_after = host.lock().app_snapshot(app)?;

    Ok(json!({
        "version": angelo_core::core_version(),
        "window": window_before,
        "run": summary,
        "application": app_after,
    }))
}

#[cfg(test)]
mod tests {
    use super::{run_session, Args};
    use angelo_core::CoreError;
    use clap::Parser;

    #[test]
    fn defaults_apply_without_flags() {
        let args = Args::try_parse_from(["angelo_cli"]).expect("parse");
        assert_eq!(args.title, "Angelo Test");
        assert_eq!((args.width, args.height, args.frames), (800, 600, 5));
    }

    #[test]
    fn malformed_numbers_are_rejected_by_the_parser() {
        assert!(Args::try_parse_from(["angelo_cli", "--width", "800x"]).is_err());
        assert!(Args::try_parse_from(["angelo_cli", "--frames", "0"]).is_err());
    }

    #[test]
    fn session_report_carries_run_summary() {
        let args =
            Args::try_parse_from(["angelo_cli", "--title", "demo", "--frames", "2"]).expect("parse");
        let report = run_session(&args).expect("session");
        assert_eq!(report["run"]["reason"], "frame_limit");
        assert_eq!(report["run"]["frames"], 2);
        assert!(report["run"]["elapsed_micros"].is_u64());
        assert_eq!(report["application"]["state"], "terminated");
        assert_eq!(report["window"]["width"], 800);
    }

    #[test]
    fn non_positive_width_fails_the_session() {
        let args = Args::try_parse_from(["angelo_cli", "--width", "-1"]).expect("parse");
        let err = run_session(&args).expect_err("invalid width");
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }
}
