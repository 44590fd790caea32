use wisata_core::error::WisataError;

/// Errors from the language model and encyclopedia clients.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("api error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("empty response")]
    EmptyResponse,
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_connect() {
            ProviderError::Connect(err.to_string())
        } else if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else {
            ProviderError::Http(err.to_string())
        }
    }
}

impl From<ProviderError> for WisataError {
    fn from(err: ProviderError) -> Self {
        WisataError::Provider(err.to_string())
    }
}
