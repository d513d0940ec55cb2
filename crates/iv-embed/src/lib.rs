//! Embedders: turn an image file or a text query into a fixed-length vector.
//!
//! - [`RemoteEmbedder`]: JSON inference endpoint (base64 image or text in, vector out)
//! - [`LocalClipEmbedder`]: CLIP ViT-B/32 in-process (feature `local-clip`)
//! - [`HashEmbedder`]: deterministic, non-semantic; for offline runs and tests

pub mod error;
pub mod hash;
#[cfg(feature = "local-clip")]
pub mod local;
pub mod remote;
pub mod traits;

pub use error::{EmbedError, Result};
pub use hash::HashEmbedder;
#[cfg(feature = "local-clip")]
pub use local::LocalClipEmbedder;
pub use remote::RemoteEmbedder;
pub use traits::{EmbedInput, Embedder};

use iv_core::{EmbeddingConfig, EmbeddingProvider};
use std::sync::Arc;
use tracing::{info, warn};

/// Build the embedder selected by `config.provider`.
pub fn from_config(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    let embedder: Arc<dyn Embedder> = match config.provider {
        EmbeddingProvider::Remote => Arc::new(RemoteEmbedder::from_config(config)?),
        EmbeddingProvider::Hash => Arc::new(HashEmbedder::new(config.dimension)),
        EmbeddingProvider::Local => local_embedder()?,
    };
    if embedder.dimension() != config.dimension {
        warn!(
            configured = config.dimension,
            actual = embedder.dimension(),
            "embedder dimension differs from configuration, using the embedder's"
        );
    }
    info!(embedder = embedder.name(), dimension = embedder.dimension(), "embedder ready");
    Ok(embedder)
}

#[cfg(feature = "local-clip")]
fn local_embedder() -> Result<Arc<dyn Embedder>> {
    Ok(Arc::new(LocalClipEmbedder::new()?))
}

#[cfg(not(feature = "local-clip"))]
fn local_embedder() -> Result<Arc<dyn Embedder>> {
    Err(EmbedError::Unsupported(
        "the local CLIP embedder requires building with the `local-clip` feature".into(),
    ))
}
