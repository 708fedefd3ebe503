//! File logging. The terminal is owned by the UI, so everything goes to a
//! daily rolling file instead of stderr.

use std::fs;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "tui-crud.log";
const DEFAULT_FILTER: &str = "tui_crud=info";

pub fn log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("tui-crud")
        .join("logs")
}

fn env_filter(config_filter: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config_filter.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Keep the guard alive until exit or the
/// last lines are lost.
pub fn init_tracing(config_filter: Option<&str>) -> Option<WorkerGuard> {
    let log_dir = log_directory();
    if fs::create_dir_all(&log_dir).is_err() {
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config_filter))
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .is_ok();

    if !installed {
        return None;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());
        tracing::error!(target: "panic", location = %location, "{}", panic_info);
        previous_hook(panic_info);
    }));

    tracing::info!(log_dir = %log_dir.display(), "logging initialized");
    Some(guard)
}
