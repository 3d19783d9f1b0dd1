use std::sync::Arc;

use base64::Engine as _;
use image::DynamicImage;
use serde_json::{json, Value};

use crate::error::{GenError, ModelFailure, Result};
use crate::inference::registry::{effective_parameters, ModelRegistry};
use crate::inference::retry::{classify, FailureClass, RetryPolicy};
use crate::inference::transport::{truncate_text, InferenceTransport, TransportResponse};
use crate::models::{GeneratedImage, GenerationRequest, ModelDescriptor};

/// Tries each configured model in ascending priority order, retrying
/// transient failures within a per-model budget, and returns the first
/// successfully decoded image together with the producing model's name.
///
/// Every await is a suspend point; dropping the returned future stops any
/// further attempts.
pub struct ImageOrchestrator {
    transport: Arc<dyn InferenceTransport>,
    registry: ModelRegistry,
    policy: RetryPolicy,
}

impl ImageOrchestrator {
    pub fn new(
        transport: Arc<dyn InferenceTransport>,
        registry: ModelRegistry,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            registry,
            policy,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        if request.prompt.trim().is_empty() {
            return Err(GenError::RequestError("prompt must not be empty".into()));
        }
        if self.registry.is_empty() {
            return Err(GenError::ConfigError("no image models configured".into()));
        }

        let mut failures: Vec<ModelFailure> = Vec::new();

        for model in self.registry.models() {
            match self.attempt_model(model, request).await {
                Ok(image) => {
                    log::info!("Image generated by {}", model.name);
                    return Ok(GeneratedImage {
                        image,
                        model: model.name.clone(),
                    });
                }
                Err(failure) => {
                    log::warn!("Model failed, advancing to next: {}", failure);
                    failures.push(failure);
                }
            }
        }

        Err(GenError::AllModelsExhausted(failures))
    }

    /// Bounded retry loop for one model. Each attempt is Pending until it
    /// resolves to Success, a RetryableFailure (back to Pending while
    /// attempts remain), or a TerminalFailure.
    async fn attempt_model(
        &self,
        model: &ModelDescriptor,
        request: &GenerationRequest,
    ) -> std::result::Result<DynamicImage, ModelFailure> {
        let params = effective_parameters(model, request);
        let payload = json!({
            "inputs": request.prompt,
            "parameters": Value::Object(params),
        });

        let mut last_failure: Option<ModelFailure> = None;

        for attempt in 1..=self.policy.max_retries.max(1) {
            if attempt > 1 {
                self.policy.wait(attempt - 1).await;
            }

            log::debug!(
                "Requesting {} (attempt {}/{})",
                model.name,
                attempt,
                self.policy.max_retries
            );

            let response = match self.transport.post_json(&model.endpoint, &payload).await {
                Ok(response) => response,
                Err(e) => {
                    // An unresponsive endpoint consumes one attempt.
                    last_failure = Some(ModelFailure {
                        model: model.name.clone(),
                        status: None,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            if response.is_success() {
                // Decode failures are terminal for this model, never retried.
                return decode_image(&response).map_err(|e| ModelFailure {
                    model: model.name.clone(),
                    status: Some(response.status),
                    message: e.to_string(),
                });
            }

            let body = response.text();
            let failure = ModelFailure {
                model: model.name.clone(),
                status: Some(response.status),
                message: truncate_text(&body, 512),
            };

            match classify(response.status, &body) {
                FailureClass::Transient => {
                    log::warn!(
                        "{} temporarily unavailable (status {}), attempt {}/{}",
                        model.name,
                        response.status,
                        attempt,
                        self.policy.max_retries
                    );
                    last_failure = Some(failure);
                }
                FailureClass::Terminal => return Err(failure),
            }
        }

        Err(last_failure.unwrap_or_else(|| ModelFailure {
            model: model.name.clone(),
            status: None,
            message: "retry budget exhausted".to_string(),
        }))
    }
}

/// Backends answer with either raw image bytes (content-type image/*) or a
/// JSON envelope carrying base64 data; both decode to the same outcome.
fn decode_image(response: &TransportResponse) -> Result<DynamicImage> {
    let bytes = match &response.content_type {
        Some(content_type) if content_type.starts_with("image/") => response.body.clone(),
        _ => {
            let value: Value = serde_json::from_slice(&response.body)
                .map_err(|e| GenError::ResponseError(format!("unparseable JSON body: {}", e)))?;
            let encoded = extract_base64(&value).ok_or_else(|| {
                GenError::ResponseError("no image data in JSON response".to_string())
            })?;
            base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .map_err(|e| GenError::DecodeError(format!("invalid base64 image data: {}", e)))?
        }
    };

    image::load_from_memory(&bytes).map_err(|e| GenError::DecodeError(e.to_string()))
}

fn extract_base64(value: &Value) -> Option<&str> {
    if let Some(s) = value.get("image").and_then(Value::as_str) {
        return Some(s);
    }
    if let Some(s) = value
        .get("images")
        .and_then(Value::as_array)
        .and_then(|images| images.first())
        .and_then(Value::as_str)
    {
        return Some(s);
    }
    if let Some(s) = value.get("b64_json").and_then(Value::as_str) {
        return Some(s);
    }
    if let Some(first) = value.as_array().and_then(|items| items.first()) {
        return extract_base64(first);
    }
    None
}
