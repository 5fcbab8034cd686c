/// Client configuration
use niceplay_client::ApiConfig;
use niceplay_core::PlaylistId;
use niceplay_playback::PlaybackConfig;
use niceplay_sources::SourcesConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_CONFIG_FILE: &str = "niceplay.toml";
const ENV_PREFIX: &str = "NICEPLAY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NicePlayConfig {
    #[serde(default = "default_api")]
    pub api: ApiSettings,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub account: AccountSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_chart_playlist_id")]
    pub chart_playlist_id: PlaylistId,

    #[serde(default = "default_recommendation_playlist_id")]
    pub recommendation_playlist_id: PlaylistId,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AccountSettings {
    pub identifier: Option<String>,
    pub password: Option<String>,
}

impl AccountSettings {
    /// Both login fields, when configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.identifier.as_deref(), self.password.as_deref()) {
            (Some(identifier), Some(password)) if !identifier.is_empty() => {
                Some((identifier, password))
            }
            _ => None,
        }
    }
}

impl NicePlayConfig {
    /// Load configuration from file and environment
    ///
    /// Reads `path` when given (it must exist), otherwise `niceplay.toml` in
    /// the working directory if present. `NICEPLAY_`-prefixed variables
    /// override the file, with `__` between section and key
    /// (`NICEPLAY_API__BASE_URL`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(
            path,
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
    }

    fn load_with_env(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        let config = settings.add_source(env).build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "api.base_url is required (set NICEPLAY_API__BASE_URL)".to_string(),
            ));
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "api.timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(self.api.base_url.clone())
            .with_timeout(Duration::from_secs(self.api.timeout_secs))
    }

    pub fn sources_config(&self) -> SourcesConfig {
        SourcesConfig {
            chart_playlist_id: self.api.chart_playlist_id.clone(),
            recommendation_playlist_id: self.api.recommendation_playlist_id.clone(),
        }
    }
}

// Default values
fn default_api() -> ApiSettings {
    ApiSettings {
        base_url: default_base_url(),
        timeout_secs: default_timeout_secs(),
        chart_playlist_id: default_chart_playlist_id(),
        recommendation_playlist_id: default_recommendation_playlist_id(),
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_chart_playlist_id() -> PlaylistId {
    PlaylistId::new("2")
}

fn default_recommendation_playlist_id() -> PlaylistId {
    PlaylistId::new("1")
}
