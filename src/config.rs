use std::env;
use std::time::Duration;

use crate::error::{GenError, Result};

pub const DEFAULT_IMAGE_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/black-forest-labs/FLUX.1-schnell";
pub const DEFAULT_ENHANCER_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/HuggingFaceH4/zephyr-7b-beta";

#[derive(Debug, Clone)]
pub struct EnhancerConfig {
    pub endpoint: String,
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    /// Inject photographic quality keywords into enhanced prompts when the
    /// model left them out.
    pub photorealism: bool,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        EnhancerConfig {
            endpoint: DEFAULT_ENHANCER_ENDPOINT.to_string(),
            max_new_tokens: 200,
            temperature: 0.7,
            top_p: 0.9,
            photorealism: true,
        }
    }
}

impl EnhancerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(endpoint) = env::var("HF_PROMPT_LLM") {
            if !endpoint.trim().is_empty() {
                config.endpoint = endpoint;
            }
        }
        config
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_photorealism(mut self, enabled: bool) -> Self {
        self.photorealism = enabled;
        self
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Attempts per model before the fallback loop advances.
    pub max_retries: u32,
    /// Base backoff unit; the wait before retry n is `retry_delay * n`.
    pub retry_delay: Duration,
    pub request_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        OrchestratorConfig {
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl OrchestratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Optional contrast/sharpness adjustment applied to every generated image.
/// Disabled by default.
#[derive(Debug, Clone)]
pub struct PostProcessConfig {
    pub enabled: bool,
    pub contrast: f32,
    pub sharpen_sigma: f32,
    pub sharpen_threshold: i32,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        PostProcessConfig {
            enabled: false,
            contrast: 8.0,
            sharpen_sigma: 1.2,
            sharpen_threshold: 4,
        }
    }
}

impl PostProcessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    /// Overrides the endpoint of the highest-priority model in the default
    /// registry.
    pub image_endpoint: Option<String>,
    pub enhancer: EnhancerConfig,
    pub orchestrator: OrchestratorConfig,
    pub postprocess: PostProcessConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: None,
            image_endpoint: None,
            enhancer: EnhancerConfig::default(),
            orchestrator: OrchestratorConfig::default(),
            postprocess: PostProcessConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var("HF_API_KEY").ok().filter(|key| !key.trim().is_empty());
        let image_endpoint = env::var("HF_API_TTI_BASE")
            .ok()
            .filter(|endpoint| !endpoint.trim().is_empty());

        Config {
            api_key,
            image_endpoint,
            enhancer: EnhancerConfig::from_env(),
            orchestrator: OrchestratorConfig::default(),
            postprocess: PostProcessConfig::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_image_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.image_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_enhancer(mut self, enhancer: EnhancerConfig) -> Self {
        self.enhancer = enhancer;
        self
    }

    pub fn with_orchestrator(mut self, orchestrator: OrchestratorConfig) -> Self {
        self.orchestrator = orchestrator;
        self
    }

    pub fn with_postprocess(mut self, postprocess: PostProcessConfig) -> Self {
        self.postprocess = postprocess;
        self
    }

    /// Reports every missing required value at once.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.api_key.as_deref().map_or(true, |key| key.trim().is_empty()) {
            missing.push("HF_API_KEY");
        }
        if self.enhancer.endpoint.trim().is_empty() {
            missing.push("HF_PROMPT_LLM");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(GenError::ConfigError(format!(
                "Missing required configuration: {}",
                missing.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_reports_all_missing_values() {
        let config = Config::new().with_enhancer(EnhancerConfig::new().with_endpoint(""));
        let err = config.validate().unwrap_err();
        let text = err.to_string();
        assert!(text.contains("HF_API_KEY"));
        assert!(text.contains("HF_PROMPT_LLM"));
    }

    #[test]
    fn validate_accepts_complete_config() {
        let config = Config::new().with_api_key("hf_test");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn defaults_match_retry_contract() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay, Duration::from_secs(1));
    }

    #[test]
    fn postprocess_disabled_by_default() {
        assert!(!PostProcessConfig::default().enabled);
    }
}
