//! Error types for the conversational interface.

use wisata_core::error::WisataError;
use wisata_provider::ProviderError;
use wisata_vector::IndexError;

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("session not found: {0}")]
    SessionNotFound(uuid::Uuid),
    #[error("no history clear is pending")]
    NoPendingClear,
    #[error("session store error: {0}")]
    SessionStore(String),
    #[error("LLM error: {0}")]
    LlmError(String),
    #[error("tool error: {0}")]
    ToolError(String),
    #[error("search error: {0}")]
    SearchError(String),
}

impl From<ProviderError> for ChatError {
    fn from(err: ProviderError) -> Self {
        ChatError::LlmError(err.to_string())
    }
}

impl From<IndexError> for ChatError {
    fn from(err: IndexError) -> Self {
        ChatError::SearchError(err.to_string())
    }
}

impl From<ChatError> for WisataError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::LlmError(msg) => WisataError::Provider(msg),
            ChatError::SearchError(msg) => WisataError::Index(msg),
            other => WisataError::Api(other.to_string()),
        }
    }
}
