use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub browse: BrowseConfig,
    pub transitions: TransitionConfig,
    pub carousel: CarouselConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseConfig {
    pub page_size: u32,
    pub hint_min_chars: usize,
    pub hint_preview_limit: usize,
    pub hint_debounce_ms: u64,
    pub trending_limit: u32,
    pub new_releases_limit: u32,
    pub new_releases_page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionConfig {
    pub fade_out_ms: u64,
    pub fade_in_ms: u64,
    pub slide_ms: u64,
}

impl TransitionConfig {
    pub fn fade_out(&self) -> Duration {
        Duration::from_millis(self.fade_out_ms)
    }

    pub fn fade_in(&self) -> Duration {
        Duration::from_millis(self.fade_in_ms)
    }

    pub fn slide(&self) -> Duration {
        Duration::from_millis(self.slide_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarouselConfig {
    pub autoplay_secs: u64,
}

impl CarouselConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.autoplay_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`.
    pub filter: String,
    /// Also write a daily rolling log file to the data directory.
    pub file: bool,
}

impl AppConfig {
    /// Load config: user file (if exists), else built-in defaults.
    pub fn load() -> Result<Self, CoreError> {
        let user_path = Self::config_path();
        if user_path.exists() {
            tracing::debug!(path = %user_path.display(), "loading user config");
            let user_str = std::fs::read_to_string(&user_path)?;
            Self::parse(&user_str)
        } else {
            tracing::debug!("no user config, using built-in defaults");
            Self::parse(DEFAULT_CONFIG)
        }
    }

    pub fn parse(content: &str) -> Result<Self, CoreError> {
        toml::from_str(content).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Directory for the session database and log files.
    pub fn data_dir() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Ensure the data directory exists and return the session DB path.
    pub fn ensure_db_path() -> Result<PathBuf, CoreError> {
        let dir = Self::data_dir();
        std::fs::create_dir_all(&dir)?;
        Ok(dir.join("marquee.db"))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "marquee")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}
