use wisata_core::error::WisataError;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("cannot embed empty text")]
    EmptyText,
    #[error("vector has {actual} dimensions, index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl From<IndexError> for WisataError {
    fn from(err: IndexError) -> Self {
        WisataError::Index(err.to_string())
    }
}
