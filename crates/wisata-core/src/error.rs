use thiserror::Error;

/// Top-level error type for the Wisata system.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for WisataError` so that the composition root can
/// use `?` across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WisataError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for WisataError {
    fn from(err: toml::de::Error) -> Self {
        WisataError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for WisataError {
    fn from(err: toml::ser::Error) -> Self {
        WisataError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for WisataError {
    fn from(err: serde_json::Error) -> Self {
        WisataError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Wisata operations.
pub type Result<T> = std::result::Result<T, WisataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WisataError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: WisataError = io_err.into();
        assert!(matches!(err, WisataError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("not = [valid").unwrap_err();
        let err: WisataError = toml_err.into();
        assert!(matches!(err, WisataError::Config(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: WisataError = json_err.into();
        assert!(matches!(err, WisataError::Serialization(_)));
    }

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(WisataError, &str)> = vec![
            (
                WisataError::Dataset("bad csv".to_string()),
                "Dataset error: bad csv",
            ),
            (
                WisataError::Index("empty".to_string()),
                "Index error: empty",
            ),
            (
                WisataError::Provider("timeout".to_string()),
                "Provider error: timeout",
            ),
            (
                WisataError::Api("bind failed".to_string()),
                "API error: bind failed",
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.to_string(), expected);
        }
    }
}
