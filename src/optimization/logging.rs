use std::io;

use tracing::dispatcher::DefaultGuard;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;
use tracing_subscriber::{fmt, registry};

use crate::optimization::config::{Config, Logging};

pub const LOG_FILE_NAME: &str = "city_optimizer_log.json";

// Holds the logger guards. When they are dropped, pending log lines are flushed and logging is reset.
pub struct LogGuards {
    #[allow(dead_code)]
    log_guard: Option<WorkerGuard>,
    #[allow(dead_code)]
    default: DefaultGuard,
}

/// Logs INFO and above to stderr for the current thread.
pub fn init_console_logging_thread_local() -> DefaultGuard {
    let collector = tracing_subscriber::registry().with(
        fmt::Layer::new()
            .with_writer(io::stderr)
            .with_filter(LevelFilter::INFO),
    );
    tracing::subscriber::set_default(collector)
}

/// Logs to stderr and, if `output.logging` is `Info`, additionally into a json file in the
/// output directory (the working directory if none is configured).
pub fn init_logging(config: &Config) -> LogGuards {
    let (log_layer, log_guard) = if Logging::Info == config.output().logging {
        let dir = config.output_dir().unwrap_or_else(|| "./".into());
        let log_file_appender = rolling::never(&dir, LOG_FILE_NAME);
        let (log_file, log_guard) = non_blocking(log_file_appender);
        let layer = fmt::Layer::new()
            .with_writer(log_file)
            .json()
            .with_ansi(false)
            .with_filter(LevelFilter::INFO);
        (Some(layer), Some(log_guard))
    } else {
        (None, None)
    };

    let console_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(LevelFilter::INFO);

    // Add `Optional`s. If None, then the corresponding layer is not added.
    let collector = registry().with(log_layer).with(console_layer);
    let default = tracing::subscriber::set_default(collector);

    LogGuards { log_guard, default }
}
