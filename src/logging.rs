//! Tracing setup for the binary: a daily log file plus warnings on stderr.

use color_eyre::{eyre::eyre, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `default_level`. stdout stays reserved for command
/// output. The returned guard flushes the file writer when dropped and must
/// live until exit.
pub fn init(log_dir: Option<&Path>, default_level: &str, verbose: bool) -> Result<Option<WorkerGuard>> {
  let level = if verbose { "debug" } else { default_level };
  let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

  let console_layer = fmt::layer()
    .with_writer(std::io::stderr)
    .with_target(false)
    .with_filter(EnvFilter::new(if verbose { "debug" } else { "warn" }));

  let (file_layer, guard) = match log_dir {
    Some(dir) => {
      std::fs::create_dir_all(dir)
        .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;
      let appender = tracing_appender::rolling::daily(dir, "fintrack.log");
      let (writer, guard) = tracing_appender::non_blocking(appender);
      let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);
      (Some(layer), Some(guard))
    }
    None => (None, None),
  };

  tracing_subscriber::registry()
    .with(filter)
    .with(file_layer)
    .with(console_layer)
    .try_init()
    .map_err(|e| eyre!("Failed to install tracing subscriber: {}", e))?;

  Ok(guard)
}
