use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::{EmbedError, Result};

/// What to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedInput {
    Image(PathBuf),
    Text(String),
}

/// Trait for embedding providers. Images and text land in the same space.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed one input into a vector of length `dimension()`.
    async fn embed(&self, input: &EmbedInput) -> Result<Vec<f32>>;

    async fn embed_image(&self, path: &Path) -> Result<Vec<f32>> {
        self.embed(&EmbedInput::Image(path.to_path_buf())).await
    }

    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&EmbedInput::Text(text.to_string())).await
    }

    fn dimension(&self) -> usize;

    /// Short description for logs.
    fn name(&self) -> &str;
}

/// Read an image file; a missing file is the "bad file name" condition.
pub(crate) async fn read_image(path: &Path) -> Result<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(EmbedError::ImageNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn check_dimension(vector: &[f32], expected: usize) -> Result<()> {
    if vector.len() != expected {
        return Err(EmbedError::DimensionMismatch { expected, got: vector.len() });
    }
    Ok(())
}
