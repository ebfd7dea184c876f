use crate::{error::ConfigError, generation::RetryPolicy, models::ImageModel};
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MAX_QUEUE_SIZE: usize = 5;
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub max_queue_size: usize,
    pub debounce: Duration,
    pub retry: RetryPolicy,
    pub default_model: ImageModel,
}

impl Default for QueueConfig {
    fn default() -> Self {
        QueueConfig {
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            retry: RetryPolicy::default(),
            default_model: ImageModel::default(),
        }
    }
}

impl QueueConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `IMAGEN_*` overrides; unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(size) = parse_var::<usize>("IMAGEN_MAX_QUEUE_SIZE")? {
            config.max_queue_size = size;
        }
        if let Some(ms) = parse_var::<u64>("IMAGEN_DEBOUNCE_MS")? {
            config.debounce = Duration::from_millis(ms);
        }
        if let Some(retries) = parse_var::<u32>("IMAGEN_MAX_RETRIES")? {
            config.retry.max_retries = retries;
        }
        if let Some(ms) = parse_var::<u64>("IMAGEN_INITIAL_BACKOFF_MS")? {
            config.retry.initial_backoff = Duration::from_millis(ms);
        }
        if let Ok(model) = env::var("IMAGEN_DEFAULT_MODEL") {
            config.default_model = model.parse().map_err(|value| ConfigError::InvalidValue {
                key: "IMAGEN_DEFAULT_MODEL".to_string(),
                value,
            })?;
        }

        Ok(config)
    }

    pub fn with_max_queue_size(mut self, size: usize) -> Self {
        self.max_queue_size = size;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_default_model(mut self, model: ImageModel) -> Self {
        self.default_model = model;
        self
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|key| !key.is_empty());
        let base_url =
            env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string());

        GeminiConfig { api_key, base_url }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn parse_var<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QueueConfig::new();
        assert_eq!(config.max_queue_size, 5);
        assert_eq!(config.debounce, Duration::from_millis(500));
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.default_model, ImageModel::GeminiFlashImage);
    }

    #[test]
    fn test_builders() {
        let config = QueueConfig::new()
            .with_max_queue_size(2)
            .with_debounce(Duration::ZERO)
            .with_default_model(ImageModel::GeminiProImage);
        assert_eq!(config.max_queue_size, 2);
        assert_eq!(config.debounce, Duration::ZERO);
        assert_eq!(config.default_model, ImageModel::GeminiProImage);

        let gemini = GeminiConfig::new().with_api_key("key").with_base_url("http://localhost:9");
        assert_eq!(gemini.api_key.as_deref(), Some("key"));
        assert_eq!(gemini.base_url, "http://localhost:9");
    }
}
