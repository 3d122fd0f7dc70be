//! Generation backends and prompt assembly for the notes assistant.

pub mod gemini;
#[cfg(test)]
pub mod mock;
pub mod prompt;

use std::sync::Arc;

use async_trait::async_trait;

pub use gemini::GeminiBackend;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("API key not set")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("model returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode model response: {0}")]
    Decode(String),
    #[error("response blocked: {0}")]
    Blocked(String),
}

/// Decoding parameters sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 2048,
        }
    }
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text for a single prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}

/// Shared handle to the configured backend.
pub type Ai = Arc<dyn GenerationBackend>;

pub fn from_config(config: &crate::config::Config) -> Result<Ai> {
    let backend = GeminiBackend::from_config(config)?;
    Ok(Arc::new(backend))
}
