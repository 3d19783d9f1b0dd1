use serde_json::{json, Map, Value};

use crate::config::DEFAULT_IMAGE_ENDPOINT;
use crate::models::{GenerationRequest, ModelCapability, ModelDescriptor};

/// Immutable, priority-ordered set of image models. Built once at startup
/// and shared read-only across requests.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<ModelDescriptor>,
}

impl ModelRegistry {
    /// Stable sort: ties keep the configured order.
    pub fn new(mut models: Vec<ModelDescriptor>) -> Self {
        models.sort_by_key(|model| model.priority);
        ModelRegistry { models }
    }

    /// The stock registry: FLUX.1-schnell first, slower Stable Diffusion
    /// endpoints as fallbacks. `image_endpoint` overrides the primary's URI.
    pub fn flux_defaults(image_endpoint: Option<&str>) -> Self {
        let primary_endpoint = image_endpoint.unwrap_or(DEFAULT_IMAGE_ENDPOINT);

        Self::new(vec![
            ModelDescriptor::new("flux-schnell", primary_endpoint, 0)
                .with_default("num_inference_steps", json!(4))
                .with_default("guidance_scale", json!(0.0))
                .with_default(
                    "negative_prompt",
                    json!("blurry, distorted, low quality, deformed"),
                )
                .with_capability(ModelCapability::Photorealism)
                .with_capability(ModelCapability::Fast),
            ModelDescriptor::new(
                "sdxl-base",
                "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-xl-base-1.0",
                1,
            )
            .with_default("num_inference_steps", json!(30))
            .with_default("guidance_scale", json!(7.5))
            .with_default(
                "negative_prompt",
                json!("cartoon, painting, illustration, worst quality, low quality"),
            )
            .with_capability(ModelCapability::Photorealism),
            ModelDescriptor::new(
                "sd-2-1",
                "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-2-1",
                2,
            )
            .with_default("num_inference_steps", json!(25))
            .with_default("guidance_scale", json!(7.0))
            .with_default("negative_prompt", json!("low quality, watermark"))
            .with_capability(ModelCapability::Artistic),
        ])
    }

    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }
}

/// Build the effective parameter table for one model: the model's tuned
/// defaults, the user's negative prompt appended to (never replacing) the
/// model's base exclusion list, then the remaining caller values overlaid
/// with the caller winning on direct key conflicts.
pub fn effective_parameters(
    model: &ModelDescriptor,
    request: &GenerationRequest,
) -> Map<String, Value> {
    let mut params = model.default_parameters.clone();

    if let Some(user_negative) = request
        .negative_prompt
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        let merged = match model.base_negative_prompt() {
            Some(base) => format!("{}, {}", base, user_negative),
            None => user_negative.to_string(),
        };
        params.insert("negative_prompt".to_string(), Value::String(merged));
    }

    if let Some(steps) = request.num_inference_steps {
        params.insert("num_inference_steps".to_string(), json!(steps));
    }
    if let Some(scale) = request.guidance_scale {
        params.insert("guidance_scale".to_string(), json!(scale));
    }
    for (key, value) in &request.extra {
        if key != "negative_prompt" {
            params.insert(key.clone(), value.clone());
        }
    }

    params
}
