//! Region decode and fetch errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("region length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Failure reported by whatever supplies raw region bytes.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("region not found")]
    NotFound,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid entity data: {0}")]
    Entities(#[from] serde_json::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
