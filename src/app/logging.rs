//! Console and per-task file logging.
//!
//! The process-wide subscriber writes to stderr. While a task runs, its future
//! carries its own [`Dispatch`] that appends to `<logs_dir>/<task id>.log`
//! (and mirrors to stderr when verbose); the dispatcher is dropped with the
//! future, so nothing outlives the task.

use std::fs;
use std::path::Path;

use tracing::Dispatch;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::app::{Result, TrawlerError};
use crate::domain::timestamp::TIMESTAMP_FORMAT;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn timer() -> ChronoLocal {
    ChronoLocal::new(TIMESTAMP_FORMAT.to_string())
}

/// Installs the global stderr subscriber. Safe to call more than once.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_timer(timer()).with_target(false))
        .with(env_filter())
        .try_init();
}

/// A dispatcher that appends the task's log lines to `<logs_dir>/<task_id>.log`.
pub fn task_dispatch(logs_dir: &Path, task_id: &str, console: bool) -> Result<Dispatch> {
    fs::create_dir_all(logs_dir).map_err(|e| TrawlerError::Persistence {
        path: logs_dir.to_path_buf(),
        source: e,
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(format!("{}.log", task_id))
        .build(logs_dir)
        .map_err(|e| TrawlerError::Config(format!("Cannot open log for {}: {}", task_id, e)))?;

    let file_layer = fmt::layer()
        .with_writer(appender)
        .with_ansi(false)
        .with_target(false)
        .with_timer(timer());

    let console_layer = console.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_timer(timer())
    });

    let subscriber = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .with(env_filter());

    Ok(Dispatch::new(subscriber))
}
