use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::EnhancerConfig;
use crate::error::{GenError, Result};
use crate::inference::transport::{truncate_text, InferenceTransport};
use crate::models::GeneratedText;

const TEMPLATE_DELIMITERS: [&str; 4] = ["</s>", "<|system|>", "<|user|>", "<|assistant|>"];
const QUALITY_PREFIX: &str = "photorealistic, highly detailed, 8K UHD, DSLR photograph";

/// Rewrites a short user intent into a rich descriptive prompt via a hosted
/// text-generation endpoint. Exactly one outbound request per call, no
/// internal retry; fallback to the raw intent is the caller's decision.
pub struct PromptEnhancer {
    transport: Arc<dyn InferenceTransport>,
    config: EnhancerConfig,
}

impl PromptEnhancer {
    pub fn new(transport: Arc<dyn InferenceTransport>, config: EnhancerConfig) -> Self {
        Self { transport, config }
    }

    fn instruction(user_intent: &str) -> String {
        format!(
            "<|system|>\n\
             You are an expert at crafting prompts for photorealistic image generation.\n\
             Rewrite the user's intention into a single detailed photographic prompt.\n\
             Always cover: the main subject, the environment, lighting and atmosphere,\n\
             composition and camera perspective, and real-world materials and textures.\n\
             Prefer photography vocabulary (depth of field, focal length, golden hour,\n\
             natural shadows). Avoid cartoon, fantasy, or abstract style terms.\n\
             Respond ONLY with the prompt. No explanations, no quotes.</s>\n\
             <|user|>\n\
             Create a photorealistic prompt for: {}</s>\n\
             <|assistant|>",
            user_intent
        )
    }

    pub async fn enhance(&self, user_intent: &str) -> Result<String> {
        let payload = json!({
            "inputs": Self::instruction(user_intent),
            "parameters": {
                "max_new_tokens": self.config.max_new_tokens,
                "temperature": self.config.temperature,
                "top_p": self.config.top_p,
                "do_sample": true,
                "return_full_text": false,
                "stop": ["</s>", "<|user|>", "<|system|>"],
            }
        });

        log::debug!("Enhancing prompt via {}", self.config.endpoint);

        let response = self
            .transport
            .post_json(&self.config.endpoint, &payload)
            .await
            .map_err(|e| GenError::EnhancementError(e.to_string()))?;

        if !response.is_success() {
            return Err(GenError::EnhancementError(format!(
                "status {}: {}",
                response.status,
                truncate_text(&response.text(), 256)
            )));
        }

        let value: Value = serde_json::from_slice(&response.body)
            .map_err(|e| GenError::EnhancementError(format!("unparseable response: {}", e)))?;
        let first: GeneratedText = value
            .as_array()
            .and_then(|items| items.first())
            .cloned()
            .and_then(|item| serde_json::from_value(item).ok())
            .ok_or_else(|| {
                GenError::EnhancementError("unexpected response format".to_string())
            })?;

        let enhanced = self.postprocess(&first.generated_text);
        if enhanced.is_empty() {
            return Err(GenError::EnhancementError(
                "model returned an empty prompt".to_string(),
            ));
        }

        log::info!("Prompt enhanced ({} chars)", enhanced.len());
        Ok(enhanced)
    }

    /// Strip leaked template delimiters, trim, and (when tuned for
    /// photorealism) prepend quality keywords the model left out.
    fn postprocess(&self, raw: &str) -> String {
        let mut text = raw.to_string();
        for delimiter in TEMPLATE_DELIMITERS {
            text = text.replace(delimiter, "");
        }
        let text = text.trim().to_string();

        if text.is_empty() {
            return text;
        }

        if self.config.photorealism && !text.to_lowercase().contains("photorealistic") {
            format!("{}, {}", QUALITY_PREFIX, text)
        } else {
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::transport::fake::{enhancer_response, status_response, FakeTransport};

    const ENDPOINT: &str = "https://example.test/enhancer";

    fn enhancer(transport: Arc<FakeTransport>, photorealism: bool) -> PromptEnhancer {
        let config = EnhancerConfig::new()
            .with_endpoint(ENDPOINT)
            .with_photorealism(photorealism);
        PromptEnhancer::new(transport, config)
    }

    #[tokio::test]
    async fn strips_leaked_template_delimiters() {
        let transport = Arc::new(FakeTransport::new());
        transport.script(
            ENDPOINT,
            enhancer_response("a photorealistic harbor at dawn</s><|user|>"),
        );

        let enhanced = enhancer(transport, true).enhance("harbor").await.unwrap();
        assert_eq!(enhanced, "a photorealistic harbor at dawn");
    }

    #[tokio::test]
    async fn injects_quality_keywords_when_absent() {
        let transport = Arc::new(FakeTransport::new());
        transport.script(ENDPOINT, enhancer_response("a harbor at dawn"));

        let enhanced = enhancer(transport, true).enhance("harbor").await.unwrap();
        assert_eq!(
            enhanced,
            "photorealistic, highly detailed, 8K UHD, DSLR photograph, a harbor at dawn"
        );
    }

    #[tokio::test]
    async fn leaves_prompt_alone_when_photorealism_disabled() {
        let transport = Arc::new(FakeTransport::new());
        transport.script(ENDPOINT, enhancer_response("a harbor at dawn"));

        let enhanced = enhancer(transport, false).enhance("harbor").await.unwrap();
        assert_eq!(enhanced, "a harbor at dawn");
    }

    #[tokio::test]
    async fn sends_exactly_one_request() {
        let transport = Arc::new(FakeTransport::new());
        transport.script(ENDPOINT, status_response(503, "loading"));

        let result = enhancer(transport.clone(), true).enhance("harbor").await;
        assert!(matches!(result, Err(GenError::EnhancementError(_))));
        assert_eq!(transport.calls_to(ENDPOINT), 1);
    }

    #[tokio::test]
    async fn embeds_the_intent_in_the_instruction_payload() {
        let transport = Arc::new(FakeTransport::new());
        transport.script(ENDPOINT, enhancer_response("anything"));

        enhancer(transport.clone(), true)
            .enhance("a red lighthouse")
            .await
            .unwrap();

        let calls = transport.calls();
        let inputs = calls[0].payload["inputs"].as_str().unwrap();
        assert!(inputs.contains("a red lighthouse"));
        assert!(inputs.contains("<|assistant|>"));
        assert_eq!(calls[0].payload["parameters"]["max_new_tokens"], 200);
    }

    #[tokio::test]
    async fn rejects_unexpected_response_shapes() {
        let transport = Arc::new(FakeTransport::new());
        transport.script(ENDPOINT, status_response(200, "{\"detail\": \"oops\"}"));

        let result = enhancer(transport, true).enhance("harbor").await;
        assert!(matches!(result, Err(GenError::EnhancementError(_))));
    }

    #[tokio::test]
    async fn empty_enhancement_is_an_error() {
        let transport = Arc::new(FakeTransport::new());
        transport.script(ENDPOINT, enhancer_response("</s>  "));

        let result = enhancer(transport, true).enhance("harbor").await;
        assert!(matches!(result, Err(GenError::EnhancementError(_))));
    }
}
