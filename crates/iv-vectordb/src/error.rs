use thiserror::Error;

#[derive(Error, Debug)]
pub enum VectorDbError {
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
    #[error("Collection already exists: {0}")]
    CollectionAlreadyExists(String),
    #[error("Collection {name} has dimension {existing}, requested {requested}")]
    MismatchedDimension { name: String, existing: usize, requested: usize },
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid collection name: {0:?}")]
    InvalidName(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, VectorDbError>;
