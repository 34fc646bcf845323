use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a configuration value came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A value paired with where it was set
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

fn default_delay_ms() -> u64 {
    1000
}

/// Reconciliation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Delay between reconnecting and reconciling, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Reconcile pending entities before commands when online (default: false)
    #[serde(default)]
    pub auto_sync: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            auto_sync: false,
        }
    }
}

/// Resolved settings for one invocation
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding the state snapshot and account list
    pub data_dir: ConfigValue<PathBuf>,
    /// Force offline mode regardless of the simulated network
    pub offline: ConfigValue<bool>,
    /// Config file that was read, if one existed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    /// Sync configuration
    pub sync: SyncConfig,
}

/// On-disk shape of config.yaml; every key is optional
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    offline: Option<bool>,
    sync: Option<SyncConfig>,
}

impl Config {
    /// Resolves settings. Environment beats the config file, which beats defaults.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, |name| std::env::var(name).ok())
    }

    /// Like [`Config::load`], reading environment variables through `env`.
    pub fn load_with_env(
        config_path: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut offline = ConfigValue::new(false, ConfigSource::Default);
        let mut config_file = None;
        let mut sync = SyncConfig::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(dir) = file_config.data_dir {
                // Relative to the config file, not the working directory
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(value) = file_config.offline {
                offline = ConfigValue::new(value, ConfigSource::File);
            }
            if let Some(sync_config) = file_config.sync {
                sync = sync_config;
            }
        }

        if let Some(dir) = env("BAKUL_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Some(value) = env("BAKUL_OFFLINE") {
            let value = parse_bool("BAKUL_OFFLINE", &value)?;
            offline = ConfigValue::new(value, ConfigSource::Environment);
        }
        if let Some(value) = env("BAKUL_SYNC_DELAY_MS") {
            sync.delay_ms = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv("BAKUL_SYNC_DELAY_MS", value.clone()))?;
        }
        if let Some(value) = env("BAKUL_AUTO_SYNC") {
            sync.auto_sync = parse_bool("BAKUL_AUTO_SYNC", &value)?;
        }

        Ok(Self {
            data_dir,
            offline,
            config_file,
            sync,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/bakul/
    /// - macOS: ~/Library/Application Support/bakul/
    /// - Windows: %APPDATA%/bakul/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bakul")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/bakul/
    /// - macOS: ~/Library/Application Support/bakul/
    /// - Windows: %APPDATA%/bakul/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bakul")
    }

    /// `config.yaml` inside [`Config::default_config_dir`]
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidEnv(name, value.to_string())),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidEnv(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidEnv(name, value) => {
                write!(f, "Invalid value for {}: '{}'", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
