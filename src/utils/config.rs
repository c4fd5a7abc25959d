use crate::utils::errors::{Result, SignboardError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const API_URL_ENV: &str = "SIGNBOARD_API_URL";

/// Read from the working directory when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "signboard.toml";

/// The backend refuses more than this many entries per page.
pub const MAX_PER_PAGE: u32 = 50;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub history: HistoryConfig,
    pub upload: UploadConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub target_language: String,
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub per_page: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_bytes: u64,
    pub preview_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            target_language: "en".to_string(),
            request_timeout_seconds: None,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { per_page: 10 }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: 16 * 1024 * 1024,
            preview_dir: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SignboardError::ConfigError(format!("{}: {}", path, e)))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: AppConfig =
            toml::from_str(content).map_err(|e| SignboardError::ConfigError(e.to_string()))?;
        config.normalize();
        Ok(config)
    }

    /// An explicit `path` must load; without one the default file is
    /// optional.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => {
                let mut config = Self::load_from_file(p)?;
                config.apply_env_overrides();
                Ok(config)
            }
            None => Ok(Self::load_or_default(Some(DEFAULT_CONFIG_FILE))),
        }
    }

    pub fn load_or_default(path: Option<&str>) -> Self {
        let mut config = match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Falling back to default configuration");
                Self::default()
            }),
            None => Self::default(),
        };
        config.apply_env_overrides();
        config
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.server.base_url = url;
            }
        }
        self.normalize();
    }

    fn normalize(&mut self) {
        self.history.per_page = self.history.per_page.clamp(1, MAX_PER_PAGE);
        while self.server.base_url.ends_with('/') {
            self.server.base_url.pop();
        }
    }
}
