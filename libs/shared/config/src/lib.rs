use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_API_BASE_URL: &str =
    "https://smartcare-hms-hospital-management-system.onrender.com/api";
pub const DEFAULT_STORAGE_PATH: &str = ".smartcare/storage.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub storage_path: PathBuf,
    pub request_timeout: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            request_timeout: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            api_base_url: env::var("HMS_API_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("HMS_API_BASE_URL not set, using default");
                    DEFAULT_API_BASE_URL.to_string()
                }),
            storage_path: env::var("HMS_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    warn!("HMS_STORAGE_PATH not set, using default");
                    PathBuf::from(DEFAULT_STORAGE_PATH)
                }),
            request_timeout: env::var("HMS_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|raw| match raw.trim().parse::<u64>() {
                    Ok(secs) => Some(Duration::from_secs(secs)),
                    Err(_) => {
                        warn!("HMS_REQUEST_TIMEOUT_SECS is not a number: {}", raw);
                        None
                    }
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - API base URL is empty");
        }

        config
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_base_url.trim().is_empty()
    }
}
