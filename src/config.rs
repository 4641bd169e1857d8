use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result, anyhow};

pub const DEFAULT_API_BASE: &str = "http://localhost:5050/api";
pub const DEFAULT_RECONNECT_SECS: u64 = 30;

/// A preset query bound to a number key
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct QuickAction {
    pub label: String,
    pub query: String,
}

impl QuickAction {
    fn new(label: &str, query: &str) -> Self {
        Self {
            label: label.to_string(),
            query: query.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    pub reconnect_interval_secs: u64,
    pub request_timeout_secs: Option<u64>,
    pub quick_actions: Vec<QuickAction>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            reconnect_interval_secs: DEFAULT_RECONNECT_SECS,
            request_timeout_secs: None,
            quick_actions: default_quick_actions(),
        }
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn reconnect_interval(&self) -> Duration {
        // Zero would make the interval spin.
        Duration::from_secs(self.reconnect_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("analyst-chat").join("config.json"))
    }

    /// Default log file location, next to the config.
    pub fn default_log_path() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .or_else(dirs::config_dir)
            .ok_or_else(|| anyhow!("Could not determine data directory"))?;

        Ok(data_dir.join("analyst-chat").join("analyst-chat.log"))
    }
}

fn default_quick_actions() -> Vec<QuickAction> {
    vec![
        QuickAction::new("Unhealthy pods", "What pods are unhealthy in my cluster?"),
        QuickAction::new("Recent alerts", "Summarize the alerts that fired in the last hour."),
        QuickAction::new("Failed deploys", "Why did the most recent deployment fail?"),
        QuickAction::new("Resource pressure", "Which nodes are under CPU or memory pressure?"),
    ]
}
