//! Descriptor loading errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid descriptor JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate material id {0}")]
    DuplicateMaterial(i16),

    #[error("duplicate matmod id {0}")]
    DuplicateMod(i16),
}
