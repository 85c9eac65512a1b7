//! Text generation for roasts and battles
//!
//! The generator is treated as an opaque oracle: it takes a prompt and returns text.
//! [`GeminiClient`] is the production implementation; handlers only see the
//! [`TextGenerator`] trait.

pub mod gemini;
pub mod prompts;

pub use gemini::{GeminiClient, GenerationError};

use async_trait::async_trait;

/// Something that turns a prompt into generated text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
