//! Structured logging setup.
//!
//! stdout carries the IPC protocol, so console output goes to stderr.
//! Optionally also writes daily-rotated files to `<data_dir>/logs/vnudge.*.log`.

use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global subscriber.
///
/// `RUST_LOG` controls the filter (default `info`, with noisy HTTP crates
/// held at `warn`). When `log_dir` is given and usable, a rolling file
/// layer is added as well.
pub fn init(log_dir: Option<&Path>) -> anyhow::Result<()> {
    let file_layer = match log_dir.map(build_file_appender) {
        Some(Ok(appender)) => Some(
            fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        ),
        Some(Err(e)) => {
            eprintln!("File logging disabled: {:#}", e);
            None
        }
        None => None,
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn,mio=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    if let Some(dir) = log_dir {
        tracing::info!(log_dir = %dir.display(), "Logger initialized");
    }
    Ok(())
}

fn build_file_appender(dir: &Path) -> anyhow::Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("vnudge")
        .filename_suffix("log")
        .max_log_files(5)
        .build(dir)?;
    Ok(appender)
}
