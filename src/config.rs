use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub stacks: StacksConfig,
  #[serde(default)]
  pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StacksConfig {
  /// Stack statuses the server should leave out of listings (case-insensitive)
  #[serde(
    default = "default_status_to_exclude",
    deserialize_with = "deserialize_status_list"
  )]
  pub status_to_exclude: Vec<String>,
}

impl Default for StacksConfig {
  fn default() -> Self {
    Self {
      status_to_exclude: default_status_to_exclude(),
    }
  }
}

fn default_status_to_exclude() -> Vec<String> {
  vec!["DELETE_COMPLETE".to_string()]
}

fn deserialize_status_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let v: Vec<String> = Vec::deserialize(deserializer)?;
  let mut statuses: Vec<String> = Vec::with_capacity(v.len());
  for status in v.into_iter().map(|s| s.trim().to_uppercase()) {
    if !status.is_empty() && !statuses.contains(&status) {
      statuses.push(status);
    }
  }
  Ok(statuses)
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
  /// Default level for this crate's log output; `RUST_LOG` takes precedence
  #[serde(default = "default_log_level")]
  pub level: String,
  /// Directory for log files (default: $XDG_DATA_HOME/cfn-explorer/logs)
  pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
      directory: None,
    }
  }
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./cfn-explorer.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/cfn-explorer/config.yaml
  ///
  /// Falls back to the built-in defaults when no file exists.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("cfn-explorer.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("cfn-explorer").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    // An empty file is a valid, all-defaults config
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    Ok(serde_yaml::from_str(contents)?)
  }
}
