pub mod enhancer;
pub mod orchestrator;
pub mod registry;
pub mod retry;
pub mod transport;

use std::sync::Arc;

use crate::config::Config;
use crate::error::{GenError, Result};
use crate::models::{Creation, GenerationOptions, PromptSource};
use crate::postprocess;

pub use enhancer::PromptEnhancer;
pub use orchestrator::ImageOrchestrator;
pub use registry::{effective_parameters, ModelRegistry};
pub use retry::{classify, FailureClass, RetryPolicy};
pub use transport::{HttpTransport, InferenceTransport, TransportResponse};

/// Facade over the enhancer and the orchestrator sharing one transport.
/// `create_image` is the operation the UI layer consumes.
pub struct InferenceClient {
    enhancer: PromptEnhancer,
    orchestrator: ImageOrchestrator,
    postprocess: crate::config::PostProcessConfig,
}

impl InferenceClient {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| GenError::ConfigError("API key is required".into()))?;
        let transport: Arc<dyn InferenceTransport> = Arc::new(HttpTransport::new(
            api_key,
            config.orchestrator.request_timeout,
        )?);
        Ok(Self::with_transport(transport, config))
    }

    /// Build against any transport; tests inject scripted fakes here.
    pub fn with_transport(transport: Arc<dyn InferenceTransport>, config: Config) -> Self {
        let registry = ModelRegistry::flux_defaults(config.image_endpoint.as_deref());
        Self::with_registry(transport, config, registry)
    }

    pub fn with_registry(
        transport: Arc<dyn InferenceTransport>,
        config: Config,
        registry: ModelRegistry,
    ) -> Self {
        let enhancer = PromptEnhancer::new(transport.clone(), config.enhancer.clone());
        let policy = RetryPolicy::new()
            .with_max_retries(config.orchestrator.max_retries)
            .with_retry_delay(config.orchestrator.retry_delay);
        let orchestrator = ImageOrchestrator::new(transport, registry, policy);

        Self {
            enhancer,
            orchestrator,
            postprocess: config.postprocess,
        }
    }

    pub fn enhancer(&self) -> &PromptEnhancer {
        &self.enhancer
    }

    pub fn orchestrator(&self) -> &ImageOrchestrator {
        &self.orchestrator
    }

    /// Enhance the intent best-effort, then run the fallback generation.
    /// Enhancement failure is an explicit branch back to the raw intent,
    /// never a fatal error.
    pub async fn create_image(
        &self,
        user_intent: &str,
        options: GenerationOptions,
    ) -> Result<Creation> {
        let intent = user_intent.trim();
        if intent.is_empty() {
            return Err(GenError::RequestError("intent must not be empty".into()));
        }

        let (prompt, prompt_source) = match self.enhancer.enhance(intent).await {
            Ok(enhanced) => (enhanced, PromptSource::Enhanced),
            Err(e) => {
                log::warn!("Prompt enhancement failed, using original intent: {}", e);
                (intent.to_string(), PromptSource::Original)
            }
        };

        let request = options.into_request(prompt.clone());
        let generated = self.orchestrator.generate(&request).await?;
        let image = postprocess::apply(&self.postprocess, generated.image);

        Ok(Creation {
            image,
            model: generated.model,
            prompt,
            prompt_source,
        })
    }
}
