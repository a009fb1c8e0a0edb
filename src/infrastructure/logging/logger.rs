use std::io;

use anyhow::Result;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::domain::models::config::{LogFormat, LoggingConfig};

/// Holds the non-blocking writer's flush guard alive for the process
/// lifetime; dropping it would silently stop delivering buffered lines.
pub struct LoggerImpl {
    _guard: WorkerGuard,
}

impl LoggerImpl {
    /// Initializes the global `tracing` subscriber. Must be called at
    /// most once per process, before any other thread logs.
    pub fn init(config: &LoggingConfig) -> Result<Self> {
        let default_level = parse_log_level(&config.level)?;
        let env_filter = EnvFilter::builder()
            .with_default_directive(default_level.into())
            .from_env_lossy();

        let (writer, guard) = tracing_appender::non_blocking(io::stdout());

        match config.format {
            LogFormat::Json => {
                let layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_filter(env_filter);
                tracing_subscriber::registry().with(layer).init();
            }
            LogFormat::Pretty => {
                let layer = tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(writer)
                    .with_target(true)
                    .with_filter(env_filter);
                tracing_subscriber::registry().with(layer).init();
            }
        }

        tracing::info!(level = %config.level, format = ?config.format, "logger initialized");

        Ok(Self { _guard: guard })
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => anyhow::bail!("invalid log level: {other}"),
    }
}
