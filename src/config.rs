use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default = "default_personalization_slot")]
    pub personalization_slot: usize,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_visibility_threshold")]
    pub visibility_threshold: f64,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_personalization_slot() -> usize {
    3
}
fn default_poll_interval_secs() -> u64 {
    5
}
fn default_generation_timeout_secs() -> u64 {
    300
}
fn default_fetch_timeout_secs() -> u64 {
    10
}
fn default_visibility_threshold() -> f64 {
    0.5
}
fn default_theme() -> String {
    "Auto-Detect".to_string()
}
fn default_data_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ecofeed")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            personalization_slot: default_personalization_slot(),
            poll_interval_secs: default_poll_interval_secs(),
            generation_timeout_secs: default_generation_timeout_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            visibility_threshold: default_visibility_threshold(),
            theme: default_theme(),
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            debug!(path = %path.display(), "loading config");
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ecofeed")
            .join("config.toml")
    }

    /// Clamp values a hand-edited config file may have pushed out of range.
    pub fn validate(&mut self) {
        if self.poll_interval_secs == 0 {
            warn!("poll_interval_secs must be positive, using 1");
            self.poll_interval_secs = 1;
        }
        if self.generation_timeout_secs < self.poll_interval_secs {
            warn!(
                "generation_timeout_secs shorter than poll interval, raising to {}",
                self.poll_interval_secs
            );
            self.generation_timeout_secs = self.poll_interval_secs;
        }
        if self.fetch_timeout_secs == 0 {
            self.fetch_timeout_secs = default_fetch_timeout_secs();
        }
        if !(self.visibility_threshold > 0.0 && self.visibility_threshold <= 1.0) {
            warn!(
                "visibility_threshold {} out of range, using default",
                self.visibility_threshold
            );
            self.visibility_threshold = default_visibility_threshold();
        }
        let trimmed = self.backend_url.trim_end_matches('/');
        if trimmed.is_empty() {
            self.backend_url = default_backend_url();
        } else if trimmed.len() != self.backend_url.len() {
            self.backend_url = trimmed.to_string();
        }
        if self.theme.trim().is_empty() {
            self.theme = default_theme();
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }
}
