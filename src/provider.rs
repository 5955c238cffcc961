//! Seams to the external generation providers.
//!
//! Services only see these traits, so tests can swap the Gemini client for
//! scripted implementations.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Free-form text generation with a system instruction.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, system: &str, prompt: &str) -> Result<String, ProviderError>;
}

/// Image generation. Returns raw image bytes, possibly fewer than requested.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_images(&self, prompt: &str, count: u32) -> Result<Vec<Bytes>, ProviderError>;
}
