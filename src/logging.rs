use crate::config::LogConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log file path; takes precedence over the config file.
pub const LOG_ENV: &str = "MINISH_LOG";
/// Filter directives; take precedence over the config file.
pub const LOG_FILTER_ENV: &str = "MINISH_LOG_FILTER";

/// Initialize tracing with optional file output.
///
/// Logging is disabled by default so nothing interleaves with the prompt or
/// with program output. Set `MINISH_LOG` (or `[log] file`) to enable it.
pub fn init_tracing(config: &LogConfig) {
    let Some(log_path) = log_file(config) else {
        return;
    };

    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    else {
        eprintln!("minish: failed to open log file {}", log_path.display());
        return;
    };

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter(config))
        .with(file_layer)
        .init();
}

fn log_file(config: &LogConfig) -> Option<PathBuf> {
    std::env::var_os(LOG_ENV)
        .map(PathBuf::from)
        .or_else(|| config.file.clone())
}

fn filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV)
        .ok()
        .or_else(|| config.filter.as_deref().and_then(|f| EnvFilter::try_new(f).ok()))
        .unwrap_or_else(|| EnvFilter::new("info"))
}
