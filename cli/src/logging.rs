use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes logging for the command line tool.
///
/// Sets up two logging outputs:
/// - Console: compact human-readable lines on stderr, stdout is left for the deploy output
/// - File: JSON in the application's data directory, see [`file_system::get_log_dir`]
///
/// Log files are rotated daily.
///
/// Default log level is "info" with the service crate at "debug". RUST_LOG overrides it:
/// - RUST_LOG=debug s3deploy deploy --config deploy.json
/// - RUST_LOG=cloud_storage=trace s3deploy deploy --config deploy.json
///
/// Returns a guard that must be kept alive for the duration of the program.
/// Dropping this guard will cause file logging to stop.
pub fn init_logging() -> tracing_appender::non_blocking::WorkerGuard {
    let log_dir = file_system::get_log_dir();

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!(
            "Warning: Failed to create log directory at {}: {}",
            log_dir.display(),
            e
        );
        eprintln!("Logs will only be written to console.");
    }

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "s3deploy.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_file(true)
        .with_line_number(true);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,service=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::debug!("Application logs are being written to: {}", log_dir.display());

    guard
}
