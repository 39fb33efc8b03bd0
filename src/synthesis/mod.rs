mod error;
mod gemini;
pub(crate) mod narrator;
mod prompts;

use async_trait::async_trait;

pub use error::SynthesisError;
pub use gemini::GeminiClient;
pub use narrator::{Narrator, NarrativeBundle, PlagiarismResult};
pub use prompts::Excerpts;

/// One request to a text-generation backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub model: String,
    pub system_instruction: String,
    pub parts: Vec<String>,
}

/// Backend that turns a prompt into free-form text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, SynthesisError>;
}
