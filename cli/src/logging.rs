//! Diagnostics for the binary: a compact stderr layer and an optional log file.
//!
//! Command output and the START/END markers are printed directly and never
//! pass through this subscriber.
use std::path::Path;
use std::sync::OnceLock;

use cmdplan_core::api::LoggingConfig;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

pub fn init(logging: &LoggingConfig) -> Result<(), String> {
    if logging.is_silent() {
        return Ok(());
    }

    let filter = filter_for(logging, std::env::var("RUST_LOG").ok())?;

    let file_layer = match logging.file.as_deref() {
        Some(path) => Some(
            fmt::layer()
                .with_writer(file_writer(path)?)
                .with_ansi(false),
        ),
        None => None,
    };

    let console_layer = logging.console.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
            .with_target(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| e.to_string())
}

/// `RUST_LOG` wins over the configured level when it is set.
fn filter_for(logging: &LoggingConfig, rust_log: Option<String>) -> Result<EnvFilter, String> {
    let directive = rust_log
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| logging.level.clone());

    EnvFilter::try_new(directive.trim())
        .map_err(|e| format!("invalid log filter {directive:?}: {e}"))
}

/// Non-blocking appender for `path`; its directory is created when missing.
fn file_writer(path: &Path) -> Result<NonBlocking, String> {
    let name = path
        .file_name()
        .ok_or_else(|| format!("log file {} has no file name", path.display()))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(dir)
        .map_err(|e| format!("create log dir {} failed: {e}", dir.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
    let _ = FILE_GUARD.set(guard);
    Ok(writer)
}
