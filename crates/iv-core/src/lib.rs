pub mod config;
pub mod error;
pub mod types;

pub use config::{
    EmbeddingConfig, EmbeddingProvider, ImageSearchConfig, ImagesConfig, ServerConfig,
    StoreBackend, StoreConfig,
};
pub use error::{IvError, Result};
pub use types::{Metadata, Record};
