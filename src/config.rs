//! Client configuration
//!
//! Defaults match the development backend; environment variables override
//! them and CLI flags override the environment.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_DETECT_PATH: &str = "/ia/detect/";
pub const DEFAULT_HEALTH_PATH: &str = "/core/ai/health/";
pub const DEFAULT_DETECTIONS_PATH: &str = "/detecciones/";

/// Detection calls wait for a slow remote inference service
pub const DEFAULT_DETECT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub const ENV_API_URL: &str = "WASTE_LENS_API_URL";
pub const ENV_DETECT_TIMEOUT: &str = "WASTE_LENS_DETECT_TIMEOUT_SECS";
pub const ENV_REQUEST_TIMEOUT: &str = "WASTE_LENS_REQUEST_TIMEOUT_SECS";
pub const ENV_TOKEN_FILE: &str = "WASTE_LENS_TOKEN_FILE";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub detect_path: String,
    pub health_path: String,
    pub detections_path: String,
    pub detect_timeout: Duration,
    pub request_timeout: Duration,
    pub token_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            detect_path: DEFAULT_DETECT_PATH.to_string(),
            health_path: DEFAULT_HEALTH_PATH.to_string(),
            detections_path: DEFAULT_DETECTIONS_PATH.to_string(),
            detect_timeout: DEFAULT_DETECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            token_file: default_token_file(),
        }
    }
}

/// `<data_dir>/waste-lens/token`
fn default_token_file() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("waste-lens").join("token"))
}

fn parse_secs(key: &str, value: Option<String>) -> Option<Duration> {
    let value = value?;
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => {
            tracing::warn!(key = key, value = %value, "Ignoring invalid timeout, using default");
            None
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            config.api_base_url = url.trim().to_string();
        }
        if let Some(timeout) = parse_secs(ENV_DETECT_TIMEOUT, lookup(ENV_DETECT_TIMEOUT)) {
            config.detect_timeout = timeout;
        }
        if let Some(timeout) = parse_secs(ENV_REQUEST_TIMEOUT, lookup(ENV_REQUEST_TIMEOUT)) {
            config.request_timeout = timeout;
        }
        if let Some(path) = lookup(ENV_TOKEN_FILE).filter(|p| !p.trim().is_empty()) {
            config.token_file = Some(PathBuf::from(path));
        }

        config
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_detect_timeout(mut self, timeout: Duration) -> Self {
        self.detect_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = Some(path.into());
        self
    }

    /// Join the base URL and an endpoint path with exactly one slash
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn detect_url(&self) -> String {
        self.endpoint(&self.detect_path)
    }

    pub fn health_url(&self) -> String {
        self.endpoint(&self.health_path)
    }

    pub fn detections_url(&self) -> String {
        self.endpoint(&self.detections_path)
    }
}
