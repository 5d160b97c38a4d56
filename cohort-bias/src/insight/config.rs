//! Configuration for the insight-generation client.
//!
//! Settings are layered with `figment`: built-in defaults, then
//! `OPENAI_API_KEY`, then an optional TOML file, then `COHORT_BIAS_*`
//! environment variables. The resulting [`InsightConfig`] is validated once and
//! passed by value to [`InsightClient::new`](super::InsightClient::new).

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::error::{InsightError, InsightResult};
use crate::error::{BiasError, Result};
use crate::security::SecureString;

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Raw, unvalidated settings as read from the configuration layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 30,
            max_retries: 2,
            temperature: 0.3,
            max_tokens: 400,
        }
    }
}

/// Validated configuration for [`InsightClient`](super::InsightClient).
#[derive(Debug, Clone)]
pub struct InsightConfig {
    api_key: SecureString,
    model: String,
    endpoint: String,
    timeout: Duration,
    max_retries: u32,
    temperature: f32,
    max_tokens: u32,
}

impl InsightConfig {
    /// Creates a configuration with defaults and the given API key.
    pub fn new(api_key: impl Into<SecureString>) -> Self {
        let defaults = InsightSettings::default();
        Self {
            api_key: api_key.into(),
            model: defaults.model,
            endpoint: defaults.endpoint,
            timeout: Duration::from_secs(defaults.timeout_secs),
            max_retries: defaults.max_retries,
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
        }
    }

    /// Loads and validates settings from the environment and an optional file.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(InsightSettings::default()))
            .merge(Env::raw().only(&["OPENAI_API_KEY"]).map(|_| "api_key".into()));
        if let Some(path) = config_file {
            if !path.exists() {
                return Err(BiasError::Configuration(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed("COHORT_BIAS_"));
        Self::from_figment(figment)
    }

    /// Extracts and validates settings from a prepared figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let settings: InsightSettings = figment
            .extract()
            .map_err(|e| BiasError::Configuration(e.to_string()))?;
        Self::from_settings(settings).map_err(|e| BiasError::Configuration(e.to_string()))
    }

    /// Validates raw settings.
    pub fn from_settings(settings: InsightSettings) -> InsightResult<Self> {
        let api_key = settings
            .api_key
            .ok_or_else(|| InsightError::configuration("no API key configured"))?;
        let config = Self {
            api_key: SecureString::new(api_key),
            model: settings.model,
            endpoint: settings.endpoint,
            timeout: Duration::from_secs(settings.timeout_secs),
            max_retries: settings.max_retries,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration can produce working requests.
    pub fn validate(&self) -> InsightResult<()> {
        if self.api_key.is_blank() {
            return Err(InsightError::configuration("API key is empty"));
        }
        if self.model.trim().is_empty() {
            return Err(InsightError::configuration("model name is empty"));
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(InsightError::configuration(format!(
                "endpoint '{}' is not an http(s) URL",
                self.endpoint
            )));
        }
        if self.timeout.is_zero() {
            return Err(InsightError::configuration("timeout must be positive"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(InsightError::configuration(format!(
                "temperature {} outside [0, 2]",
                self.temperature
            )));
        }
        Ok(())
    }

    /// Sets the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the API base URL; a trailing slash is ignored.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets how many times retryable failures are retried.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn api_key(&self) -> &SecureString {
        &self.api_key
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InsightConfig::new("key");
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_trims_endpoint() {
        let config = InsightConfig::new("key").with_endpoint("http://localhost:8080/v1/");
        assert_eq!(config.endpoint(), "http://localhost:8080/v1");
    }

    #[test]
    fn test_validation_failures() {
        assert!(InsightConfig::new(" ").validate().is_err());
        assert!(InsightConfig::new("k").with_model("").validate().is_err());
        assert!(InsightConfig::new("k")
            .with_endpoint("ftp://example.com")
            .validate()
            .is_err());
        assert!(InsightConfig::new("k")
            .with_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn test_from_figment_toml() {
        let figment = Figment::from(Serialized::defaults(InsightSettings::default())).merge(
            Toml::string(
                r#"
                api_key = "sk-test"
                model = "local-llm"
                endpoint = "http://127.0.0.1:9000/v1"
                max_retries = 0
                "#,
            ),
        );
        let config = InsightConfig::from_figment(figment).unwrap();
        assert_eq!(config.api_key().expose(), "sk-test");
        assert_eq!(config.model(), "local-llm");
        assert_eq!(config.max_retries(), 0);
        assert_eq!(config.max_tokens(), 400);
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let figment = Figment::from(Serialized::defaults(InsightSettings::default()));
        let err = InsightConfig::from_figment(figment).unwrap_err();
        assert!(matches!(err, BiasError::Configuration(_)));
        assert!(err.to_string().contains("no API key"));
    }

    #[test]
    fn test_missing_file() {
        let err = InsightConfig::load(Some(Path::new("/nonexistent/cohort-bias.toml"))).unwrap_err();
        assert!(matches!(err, BiasError::Configuration(_)));
    }
}
