//! Wisata Provider crate - clients for the external services.
//!
//! - `LanguageModel` with the Gemini `generateContent` implementation, used
//!   both for plain completions and for tool-calling agent rounds.
//! - `Encyclopedia` with the Wikipedia REST summary implementation, used by
//!   the city explorer.

pub mod error;
pub mod gemini;
pub mod types;
pub mod wikipedia;

use async_trait::async_trait;

pub use error::ProviderError;
pub use gemini::GeminiProvider;
pub use types::{ContentBlock, LlmMessage, LlmRequest, LlmResponse, ToolDef};
pub use wikipedia::{Encyclopedia, WikipediaClient};

/// A chat-style language model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// One request/response round, possibly containing tool calls.
    async fn chat(&self, request: LlmRequest) -> Result<LlmResponse, ProviderError>;

    /// Single-prompt completion without tools.
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let response = self.chat(LlmRequest::prompt(prompt)).await?;
        Ok(response.text)
    }
}
