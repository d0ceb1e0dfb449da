//! File logging for hosts embedding the explorer.

use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "cfn-explorer.log";

/// Install a global subscriber writing to a daily rolling file.
///
/// Keep the returned guard alive for as long as logs should be flushed.
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard> {
  let directory = log_directory(config)?;
  std::fs::create_dir_all(&directory)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", directory.display(), e))?;

  let appender = tracing_appender::rolling::daily(&directory, LOG_FILE_PREFIX);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(env_filter(&config.level)?)
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| eyre!("Failed to install log subscriber: {}", e))?;

  Ok(guard)
}

/// Where log files go: the configured directory, else the user data directory.
pub fn log_directory(config: &LoggingConfig) -> Result<PathBuf> {
  if let Some(directory) = &config.directory {
    return Ok(directory.clone());
  }

  let data_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?;

  Ok(data_dir.join("cfn-explorer").join("logs"))
}

/// `RUST_LOG` if set and valid, otherwise `level` for this crate only.
fn env_filter(level: &str) -> Result<EnvFilter> {
  EnvFilter::try_from_default_env().or_else(|_| {
    EnvFilter::try_new(format!("cfn_explorer={}", level))
      .map_err(|e| eyre!("Invalid log level '{}': {}", level, e))
  })
}
