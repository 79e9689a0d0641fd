//! Logging configuration for guiderag

use std::path::Path;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::{
    self,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::config::LoggingConfig;
use crate::Result;

/// Initialize logging from the `[logging]` config section
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    init_logging_with_level(&config.level, &config.log_dir)
}

/// Initialize logging with custom log level
///
/// Console output goes to stderr so interactive chat on stdout stays clean;
/// a daily rolling file is written under `log_dir`.
pub fn init_logging_with_level(level: &str, log_dir: &str) -> Result<()> {
    // Create logs directory if it doesn't exist
    let logs_dir = Path::new(log_dir);
    if !logs_dir.exists() {
        std::fs::create_dir_all(logs_dir)?;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,guiderag={level}")));

    let file_appender = tracing_appender::rolling::daily(logs_dir, "guiderag.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking)
        .with_ansi(false); // No colors in file

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| crate::GuideRagError::ConfigError(format!("logging already set: {e}")))?;

    tracing::debug!("Logging initialized with level: {}", level);

    // The writer thread must outlive main
    std::mem::forget(guard);

    Ok(())
}

/// Initialize simple logging for testing
pub fn init_simple_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(true)
        .with_max_level(tracing::Level::INFO)
        .try_init()
        .map_err(|e| crate::GuideRagError::ConfigError(format!("logging already set: {e}")))?;

    Ok(())
}
