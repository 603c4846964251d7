use crate::config::{LogFormat, LoggingConfig};
use crate::utils::error::ClientError;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Install the global subscriber.
///
/// Always writes to `{directory}/chunkview.log` (daily rotation); stdout is
/// only added when `config.stdout` is set. `RUST_LOG` wins over
/// `config.level`. Keep the returned guard alive until exit or buffered
/// lines are lost.
pub fn init_logger(config: &LoggingConfig) -> Result<WorkerGuard, ClientError> {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.level.clone());

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("chunkview")
        .filename_suffix("log")
        .build(&config.directory)
        .map_err(|e| ClientError::Logger(e.to_string()))?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_new(&log_level).map_err(|e| ClientError::Logger(e.to_string()))?;

    let result = match config.format {
        LogFormat::Json => {
            // JSON for log shipping
            let stdout_layer = config.stdout.then(|| {
                fmt::layer()
                    .json()
                    .with_writer(std::io::stdout)
                    .with_target(true)
                    .with_level(true)
            });

            tracing_subscriber::registry()
                .with(filter)
                .with(stdout_layer)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(file_writer)
                        .with_target(true)
                        .with_level(true)
                        .with_thread_ids(true),
                )
                .try_init()
        }
        LogFormat::Pretty => {
            let stdout_layer = config.stdout.then(|| {
                fmt::layer()
                    .pretty()
                    .with_writer(std::io::stdout)
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(false)
            });

            tracing_subscriber::registry()
                .with(filter)
                .with(stdout_layer)
                .with(
                    fmt::layer()
                        .with_writer(file_writer)
                        .with_target(true)
                        .with_level(true)
                        .with_ansi(false), // No colors in file
                )
                .try_init()
        }
    };

    result.map_err(|e| ClientError::Logger(e.to_string()))?;

    Ok(guard)
}
