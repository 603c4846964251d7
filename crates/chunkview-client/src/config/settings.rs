use crate::display::DisplayMode;
use crate::utils::error::ClientError;
use chunkview_proto::{CHUNKS_ENDPOINT, DEFAULT_PAGE_SIZE};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub api: ApiConfig,
    pub viewer: ViewerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ViewerConfig {
    pub page_size: u32,
    #[serde(default)]
    pub display_mode: DisplayMode,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    pub directory: PathBuf,
    /// Mirror log lines to stdout. Off for the terminal viewer.
    #[serde(default)]
    pub stdout: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Settings {
    /// Load from `config/chunkview.toml` (optional) and `CHUNKVIEW_*` env vars.
    pub fn load() -> Result<Self, ClientError> {
        Self::load_from(None)
    }

    /// Load with an explicit config file, which must exist when given.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ClientError> {
        let settings = Self::read_from(path)?;
        settings.validate()?;

        Ok(settings)
    }

    /// Layer the sources without validating, for callers that apply their
    /// own overrides and call [`Settings::validate`] afterwards.
    pub fn read_from(path: Option<&Path>) -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();

        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("config/chunkview").required(false),
        };

        let config = Config::builder()
            .set_default("api.host", "http://localhost:8000")?
            .set_default("api.timeout_seconds", 30)?
            .set_default("viewer.page_size", i64::from(DEFAULT_PAGE_SIZE))?
            .set_default("viewer.display_mode", "dark")?
            .set_default("logging.level", "info,chunkview_client=debug")?
            .set_default("logging.format", "pretty")?
            .set_default("logging.directory", "logs")?
            .set_default("logging.stdout", false)?
            .add_source(file)
            // Example: CHUNKVIEW_API__HOST=http://verba.local:8000
            .add_source(
                Environment::with_prefix("CHUNKVIEW")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        let host = self.api.host.trim();
        if host.is_empty() {
            return Err(ClientError::Config("api.host must not be empty".into()));
        }
        if !(host.starts_with("http://") || host.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "api.host must start with http:// or https:// (got {})",
                host
            )));
        }
        if self.api.timeout_seconds == 0 {
            return Err(ClientError::Config("api.timeout_seconds must be at least 1".into()));
        }
        if self.viewer.page_size == 0 {
            return Err(ClientError::Config("viewer.page_size must be at least 1".into()));
        }

        Ok(())
    }
}

impl ApiConfig {
    /// Full URL of the chunk-listing endpoint.
    pub fn chunks_url(&self) -> String {
        format!("{}{}", self.host.trim().trim_end_matches('/'), CHUNKS_ENDPOINT)
    }
}
