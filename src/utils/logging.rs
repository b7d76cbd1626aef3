use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_appender::non_blocking::WorkerGuard;
use anyhow::Result;

/// Installs the global subscriber for the demo binary.
///
/// `RUST_LOG` overrides `default_level` (the `logging.level` setting). With a directory, events
/// are also written to a dated file there; keep the returned guard alive until exit so the
/// non-blocking writer flushes.
pub fn init_logger(default_level: &str, log_file_path: Option<PathBuf>) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))?;

    let format = fmt::format()
        .with_timer(fmt::time::LocalTime::rfc_3339())
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if let Some(path) = log_file_path {
        std::fs::create_dir_all(&path)?;

        let file_appender = RollingFileAppender::new(Rotation::NEVER, path, log_file_name());
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = fmt::Layer::default()
            .event_format(format.clone())
            .with_writer(non_blocking);

        let console_layer = fmt::Layer::default()
            .event_format(format.clone().with_ansi(true))
            .with_writer(std::io::stdout);

        subscriber.with(file_layer).with(console_layer).try_init()?;

        tracing::info!("Logging initialized successfully");
        Ok(Some(guard))
    } else {
        let console_layer = fmt::Layer::default()
            .event_format(format.with_ansi(true))
            .with_writer(std::io::stdout);

        subscriber.with(console_layer).try_init()?;

        tracing::info!("Logging initialized successfully (console only)");
        Ok(None)
    }
}

fn log_file_name() -> String {
    format!("sliding-door_{}.log", chrono::Local::now().format("%Y-%m-%d"))
}
