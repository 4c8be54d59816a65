//! Configuration management for the emission prediction service

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins. Extended from the CORS_ORIGINS environment
    /// variable (comma-separated) when set.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Model artifact configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Path to the ONNX model artifact
    pub path: PathBuf,
    /// Version tag reported with every prediction and by /health
    #[serde(default = "default_model_version")]
    pub version: String,
    /// Number of intra-op threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

/// API surface configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_title")]
    pub title: String,
    /// Maximum number of routes accepted by /predict/batch
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_model_version() -> String {
    "1.0.0".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

fn default_api_title() -> String {
    "Carbon Emission Prediction API".to_string()
}

fn default_max_batch_size() -> usize {
    100
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            title: default_api_title(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file location
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("CARBON").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let mut config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // Frontend deployments pass extra origins via CORS_ORIGINS
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            config.server.cors_origins.extend(
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from),
            );
        }

        Ok(config)
    }
}
