use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub db: DbConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_wait_ms: default_max_wait_ms(),
        }
    }
}

fn default_interval_ms() -> u64 {
    2000
}
fn default_max_wait_ms() -> u64 {
    60_000
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

fn default_max_entries() -> usize {
    100
}

impl Config {
    /// A minimal in-memory config for tests and tooling that does not
    /// touch the network or a real database path.
    pub fn minimal() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost".to_string(),
            },
            db: DbConfig {
                path: PathBuf::from("./data/scanh.sqlite"),
            },
            polling: PollingConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.api.base_url.trim().is_empty() {
        anyhow::bail!("api.base_url must not be empty");
    }

    if config.polling.interval_ms == 0 {
        anyhow::bail!("polling.interval_ms must be > 0");
    }

    if config.history.max_entries == 0 {
        anyhow::bail!("history.max_entries must be > 0");
    }

    Ok(config)
}
