use std::fmt;

use thiserror::Error;

/// The last observed failure for one exhausted model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFailure {
    pub model: String,
    pub status: Option<u16>,
    pub message: String,
}

impl fmt::Display for ModelFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {}): {}", self.model, status, self.message),
            None => write!(f, "{}: {}", self.model, self.message),
        }
    }
}

#[derive(Debug, Error)]
pub enum GenError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Prompt enhancement failed: {0}")]
    EnhancementError(String),
    #[error("Image decode failed: {0}")]
    DecodeError(String),
    #[error("All models exhausted: {}", format_model_failures(.0))]
    AllModelsExhausted(Vec<ModelFailure>),
}

fn format_model_failures(failures: &[ModelFailure]) -> String {
    failures
        .iter()
        .map(|failure| failure.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, GenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_error_lists_every_model_in_order() {
        let err = GenError::AllModelsExhausted(vec![
            ModelFailure {
                model: "flux-schnell".into(),
                status: Some(503),
                message: "model is loading".into(),
            },
            ModelFailure {
                model: "sdxl-base".into(),
                status: None,
                message: "connection timed out".into(),
            },
        ]);

        let text = err.to_string();
        assert!(text.starts_with("All models exhausted: "));
        let flux = text.find("flux-schnell (status 503)").unwrap();
        let sdxl = text.find("sdxl-base: connection timed out").unwrap();
        assert!(flux < sdxl);
    }
}
