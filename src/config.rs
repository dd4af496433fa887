use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the finance API, e.g. "https://finance.example.com/api"
  pub url: String,
  /// Per-request timeout; requests wait indefinitely when unset
  pub timeout_secs: Option<u64>,
  /// Base path overrides keyed by entity type (e.g. `bank_account: /accounts`)
  #[serde(default, deserialize_with = "deserialize_path_map")]
  pub paths: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
  /// Default filter directive when RUST_LOG is unset (e.g. "info", "fintrack=debug")
  pub level: Option<String>,
  /// Directory for the daily log file (default: platform data dir)
  pub dir: Option<PathBuf>,
}

fn deserialize_path_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let m: BTreeMap<String, String> = BTreeMap::deserialize(deserializer)?;
  Ok(
    m.into_iter()
      .map(|(entity, path)| {
        let path = format!("/{}", path.trim().trim_matches('/'));
        (entity.to_lowercase(), path)
      })
      .collect(),
  )
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./fintrack.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/fintrack/config.yaml
  ///
  /// `FINTRACK_API_URL` overrides `api.url` from the file, and is enough on
  /// its own when no file exists.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    Self::load_with(
      explicit_path,
      &Self::search_paths(),
      std::env::var("FINTRACK_API_URL").ok(),
    )
  }

  fn load_with(
    explicit_path: Option<&Path>,
    search_paths: &[PathBuf],
    env_url: Option<String>,
  ) -> Result<Self> {
    let path = match explicit_path {
      Some(p) if p.exists() => Some(p.to_path_buf()),
      Some(p) => return Err(eyre!("Config file not found: {}", p.display())),
      None => search_paths.iter().find(|p| p.exists()).cloned(),
    };
    let env_url = env_url.filter(|url| !url.trim().is_empty());

    let mut config = match (path, &env_url) {
      (Some(p), _) => Self::load_from_path(&p)?,
      // No file needed when the URL comes from the environment
      (None, Some(url)) => Self::with_url(url.clone()),
      (None, None) => {
        return Err(eyre!(
          "No configuration file found. Create one at ~/.config/fintrack/config.yaml \
           or set FINTRACK_API_URL."
        ))
      }
    };

    if let Some(url) = env_url {
      config.api.url = url;
    }

    Ok(config)
  }

  pub fn with_url(url: impl Into<String>) -> Self {
    Self {
      api: ApiConfig {
        url: url.into(),
        timeout_secs: None,
        paths: BTreeMap::new(),
      },
      log: LogConfig::default(),
    }
  }

  fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("fintrack.yaml")];
    if let Some(config_dir) = dirs::config_dir() {
      paths.push(config_dir.join("fintrack").join("config.yaml"));
    }
    paths
  }

  pub fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    if config.api.url.trim().is_empty() {
      return Err(eyre!("api.url must not be empty"));
    }
    Ok(config)
  }

  /// Get the API token from environment variables.
  ///
  /// Checks FINTRACK_API_TOKEN first, then FINTRACK_TOKEN. Unauthenticated
  /// servers (local development) need neither.
  pub fn get_api_token() -> Option<String> {
    std::env::var("FINTRACK_API_TOKEN")
      .or_else(|_| std::env::var("FINTRACK_TOKEN"))
      .ok()
      .filter(|t| !t.trim().is_empty())
  }

  /// Directory for log files.
  pub fn log_dir(&self) -> Option<PathBuf> {
    self.log.dir.clone().or_else(|| {
      dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
        .map(|d| d.join("fintrack").join("logs"))
    })
  }
}
