//! Photogen turns a short natural-language intent into a photorealistic
//! image: a hosted text-generation model rewrites the intent into a rich
//! descriptive prompt, then a priority-ordered chain of hosted
//! image-generation models is tried with per-model retry and backoff until
//! one produces a decodable image.
//!
//! ```no_run
//! use photogen::{Config, GenerationOptions, InferenceClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = InferenceClient::new(Config::from_env())?;
//!     let creation = client
//!         .create_image("a lighthouse at golden hour", GenerationOptions::new())
//!         .await?;
//!     println!("{}", creation.label());
//!     creation.image.save("lighthouse.png")?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod inference;
pub mod logger;
pub mod models;
pub mod postprocess;
#[cfg(feature = "server")]
pub mod server;

pub use config::{Config, EnhancerConfig, OrchestratorConfig, PostProcessConfig};
pub use error::{GenError, ModelFailure, Result};
pub use inference::{
    HttpTransport, ImageOrchestrator, InferenceClient, InferenceTransport, ModelRegistry,
    PromptEnhancer, RetryPolicy, TransportResponse,
};
pub use models::{
    Creation, GeneratedImage, GenerationOptions, GenerationRequest, ModelCapability,
    ModelDescriptor, PromptSource,
};
