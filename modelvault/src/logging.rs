//! Tracing subscriber setup.
//!
//! The subscriber is installed once at process start by the binary; library
//! code only ever emits through the `tracing` macros and never looks up or
//! mutates logging state of its own.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// Respects `RUST_LOG` when set; otherwise logs the crate at `info`, or
/// `debug` with `verbose`. When `log_dir` is given, a non-ANSI copy of the
/// output is appended to a daily-rolled file there; the returned guard must
/// be held for the lifetime of the process so buffered lines are flushed on
/// exit.
pub fn init(log_dir: Option<&Path>, verbose: bool) -> Option<WorkerGuard> {
    let default_directive = if verbose {
        "modelvault=debug"
    } else {
        "modelvault=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "modelvault.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);

            // Second init (e.g. under test) is harmless and ignored.
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_timer(LocalTime::rfc_3339())
                        .with_target(false),
                )
                .with(
                    fmt::layer()
                        .with_timer(LocalTime::rfc_3339())
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .try_init();

            Some(guard)
        }
        None => {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_timer(LocalTime::rfc_3339())
                        .with_target(false),
                )
                .try_init();
            None
        }
    }
}
