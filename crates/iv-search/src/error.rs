use iv_core::IvError;
use iv_embed::EmbedError;
use iv_vectordb::VectorDbError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbedError),
    #[error("Vector store error: {0}")]
    Store(#[from] VectorDbError),
    #[error("No matching image in collection {0}")]
    EmptyResult(String),
    #[error("Not a JPEG image: {}", path.display())]
    UnsupportedImage { path: PathBuf },
    #[error("Query text must not be empty")]
    EmptyQuery,
    #[error("Configuration error: {0}")]
    Config(#[from] IvError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
