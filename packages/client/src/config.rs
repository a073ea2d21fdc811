//! Client configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Default backend when nothing is configured
pub const DEFAULT_API_URL: &str = "http://localhost:4001";

/// Environment variable overriding the configured backend URL
pub const API_URL_ENV: &str = "KONTO_API_URL";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the account backend
    pub api_url: String,
}

impl ClientConfig {
    /// Get the configuration file path
    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("konto")
            .join("config.toml")
    }

    /// Resolve configuration: environment first, then the config file,
    /// then the built-in default
    pub async fn resolve() -> ClientResult<Self> {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            let config = Self { api_url: url };
            config.validate()?;
            return Ok(config);
        }
        let config = Self::load().await?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from disk
    pub async fn load() -> ClientResult<Self> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| ClientError::config(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| ClientError::config(format!("Invalid config format: {}", e)))
    }

    /// Save configuration to disk
    pub async fn save(&self) -> ClientResult<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ClientError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ClientError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&path, content)
            .await
            .map_err(|e| ClientError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ClientResult<()> {
        if self.api_url.is_empty() {
            return Err(ClientError::config("API URL is required"));
        }
        let url = Url::parse(&self.api_url)
            .map_err(|e| ClientError::config(format!("Invalid API URL: {}", e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::config("API URL must use HTTP or HTTPS"));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}
