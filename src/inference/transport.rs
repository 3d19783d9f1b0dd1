use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{GenError, Result};

/// One HTTP-level outcome. Non-success statuses are data here, not errors;
/// `Err` is reserved for transport failures (connect, timeout).
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[async_trait]
pub trait InferenceTransport: Send + Sync {
    async fn post_json(&self, endpoint: &str, payload: &Value) -> Result<TransportResponse>;
}

/// reqwest-backed transport with bearer auth and a bounded request timeout.
pub struct HttpTransport {
    client: reqwest::Client,
    api_key: String,
}

impl HttpTransport {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl InferenceTransport for HttpTransport {
    async fn post_json(&self, endpoint: &str, payload: &Value) -> Result<TransportResponse> {
        let response = self
            .client
            .post(endpoint)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| GenError::RequestError(format!("POST {} failed: {}", endpoint, e)))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_ascii_lowercase());
        let body = response
            .bytes()
            .await
            .map_err(|e| GenError::ResponseError(format!("failed reading response body: {}", e)))?
            .to_vec();

        Ok(TransportResponse {
            status,
            content_type,
            body,
        })
    }
}

pub(crate) fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut truncated: String = text.chars().take(max_chars).collect();
        truncated.push_str("...");
        truncated
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use base64::Engine as _;
    use serde_json::Value;

    use super::{InferenceTransport, TransportResponse};
    use crate::error::{GenError, Result};

    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub endpoint: String,
        pub payload: Value,
    }

    #[derive(Debug, Clone)]
    pub enum Scripted {
        Response(TransportResponse),
        Error(String),
    }

    /// Scripted transport: per-endpoint response queues, consumed in order,
    /// with every call recorded.
    #[derive(Default)]
    pub struct FakeTransport {
        scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn script(&self, endpoint: &str, outcome: Scripted) {
            self.scripts
                .lock()
                .unwrap()
                .entry(endpoint.to_string())
                .or_default()
                .push_back(outcome);
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn calls_to(&self, endpoint: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|call| call.endpoint == endpoint)
                .count()
        }
    }

    #[async_trait]
    impl InferenceTransport for FakeTransport {
        async fn post_json(&self, endpoint: &str, payload: &Value) -> Result<TransportResponse> {
            self.calls.lock().unwrap().push(RecordedCall {
                endpoint: endpoint.to_string(),
                payload: payload.clone(),
            });

            let outcome = self
                .scripts
                .lock()
                .unwrap()
                .get_mut(endpoint)
                .and_then(VecDeque::pop_front);

            match outcome {
                Some(Scripted::Response(response)) => Ok(response),
                Some(Scripted::Error(message)) => Err(GenError::RequestError(message)),
                None => Err(GenError::RequestError(format!(
                    "no scripted response for {}",
                    endpoint
                ))),
            }
        }
    }

    pub fn status_response(status: u16, body: &str) -> Scripted {
        Scripted::Response(TransportResponse {
            status,
            content_type: Some("application/json".to_string()),
            body: body.as_bytes().to_vec(),
        })
    }

    pub fn png_bytes() -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            2,
            2,
            image::Rgb([120, 90, 60]),
        ));
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    pub fn raw_image_response() -> Scripted {
        Scripted::Response(TransportResponse {
            status: 200,
            content_type: Some("image/png".to_string()),
            body: png_bytes(),
        })
    }

    pub fn base64_json_response() -> Scripted {
        let encoded = base64::engine::general_purpose::STANDARD.encode(png_bytes());
        let body = serde_json::json!({ "image": encoded }).to_string();
        Scripted::Response(TransportResponse {
            status: 200,
            content_type: Some("application/json".to_string()),
            body: body.into_bytes(),
        })
    }

    pub fn enhancer_response(text: &str) -> Scripted {
        let body = serde_json::json!([{ "generated_text": text }]).to_string();
        Scripted::Response(TransportResponse {
            status: 200,
            content_type: Some("application/json".to_string()),
            body: body.into_bytes(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range_is_2xx() {
        let ok = TransportResponse {
            status: 200,
            content_type: None,
            body: Vec::new(),
        };
        assert!(ok.is_success());

        let unavailable = TransportResponse {
            status: 503,
            content_type: None,
            body: Vec::new(),
        };
        assert!(!unavailable.is_success());
    }

    #[test]
    fn truncation_keeps_short_text_intact() {
        assert_eq!(truncate_text("short", 512), "short");
        let long = "x".repeat(600);
        let truncated = truncate_text(&long, 512);
        assert_eq!(truncated.chars().count(), 515);
        assert!(truncated.ends_with("..."));
    }
}
