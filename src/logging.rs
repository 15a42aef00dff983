//! Diagnostics for the message service.
//!
//! Operational events (records appended, unparsable log lines, storage failures) go to stdout
//! and to a diagnostics file, `logs/postlog.log` unless `POSTLOG_TRACE_FILE` names another
//! path. The diagnostics file never shares a path with the message log behind `GET /logs`,
//! whose line format is read back by the codec.
//!
//! Command-line tools print records on stdout, so they use [`init_stderr_tracing`] instead.
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const TRACE_FILE_VAR: &str = "POSTLOG_TRACE_FILE";
const DEFAULT_TRACE_FILE: &str = "logs/postlog.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the server subscriber: compact stdout plus the non-blocking diagnostics file.
///
/// Respects `RUST_LOG`; defaults to `info`. The diagnostics file is skipped, with a note on
/// stderr, when it cannot be opened.
pub fn init_tracing() {
    let stdout_layer = fmt::layer().with_target(false).compact();
    let file_layer = open_trace_writer(&trace_file_path()).map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(stdout_layer)
        .with(file_layer)
        .init();
}

/// Install a stderr-only subscriber for tools whose stdout carries data.
///
/// Defaults to `warn` so that unrecognized log lines are still reported.
pub fn init_stderr_tracing() {
    tracing_subscriber::registry()
        .with(env_filter("warn"))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Diagnostics file location; blank overrides fall back to the default.
fn trace_file_path() -> PathBuf {
    std::env::var(TRACE_FILE_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TRACE_FILE.to_string())
        .into()
}

/// Open `path` for appending behind a non-blocking writer, creating its parent directory.
fn open_trace_writer(path: &Path) -> Option<NonBlocking> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(parent) {
            eprintln!("Failed to create {}: {err}", parent.display());
            return None;
        }
    }
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);
            Some(non_blocking)
        }
        Err(err) => {
            eprintln!("Failed to open trace file {}: {err}", path.display());
            None
        }
    }
}
