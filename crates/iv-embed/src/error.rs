use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("Bad file name: {}", path.display())]
    ImageNotFound { path: PathBuf },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Embedding request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Embedding service returned {status}: {body}")]
    Service { status: u16, body: String },
    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),
    #[error("Embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("Model error: {0}")]
    Model(String),
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, EmbedError>;
