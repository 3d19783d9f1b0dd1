use image::DynamicImage;
use serde::Deserialize;
use serde_json::{Map, Value};

/// One generation request as submitted to the orchestrator. Immutable once
/// built; never persisted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub num_inference_steps: Option<u32>,
    pub guidance_scale: Option<f32>,
    #[serde(default, flatten)]
    pub extra: Map<String, Value>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        GenerationRequest {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative_prompt.into());
        self
    }

    pub fn with_num_inference_steps(mut self, steps: u32) -> Self {
        self.num_inference_steps = Some(steps);
        self
    }

    pub fn with_guidance_scale(mut self, scale: f32) -> Self {
        self.guidance_scale = Some(scale);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Caller-facing knobs for `InferenceClient::create_image`; the prompt itself
/// comes from the enhancement step.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationOptions {
    pub negative_prompt: Option<String>,
    pub num_inference_steps: Option<u32>,
    pub guidance_scale: Option<f32>,
    #[serde(default, flatten)]
    pub extra: Map<String, Value>,
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_request(self, prompt: String) -> GenerationRequest {
        GenerationRequest {
            prompt,
            negative_prompt: self.negative_prompt,
            num_inference_steps: self.num_inference_steps,
            guidance_scale: self.guidance_scale,
            extra: self.extra,
        }
    }
}

/// A decoded image plus the name of whichever model actually produced it.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub image: DynamicImage,
    pub model: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSource {
    Enhanced,
    Original,
}

impl PromptSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptSource::Enhanced => "enhanced",
            PromptSource::Original => "original",
        }
    }
}

/// The result of a full create-image flow: the image, the producing model,
/// and the prompt that was actually submitted.
#[derive(Debug, Clone)]
pub struct Creation {
    pub image: DynamicImage,
    pub model: String,
    pub prompt: String,
    pub prompt_source: PromptSource,
}

impl Creation {
    pub fn label(&self) -> String {
        format!(
            "Model: {} | Prompt ({}): {}",
            self.model,
            self.prompt_source.as_str(),
            self.prompt
        )
    }
}
