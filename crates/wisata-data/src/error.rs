//! Error types for dataset loading.

use wisata_core::error::WisataError;

/// Errors raised while loading or validating a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV in {dataset}: {message}")]
    Csv { dataset: String, message: String },
    #[error("dataset {dataset} has no '{column}' column")]
    MissingColumn { dataset: String, column: String },
}

impl From<DataError> for WisataError {
    fn from(err: DataError) -> Self {
        WisataError::Dataset(err.to_string())
    }
}
