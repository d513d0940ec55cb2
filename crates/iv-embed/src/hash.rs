use async_trait::async_trait;

use crate::error::Result;
use crate::traits::{read_image, EmbedInput, Embedder};

/// Hash-based embedding provider (placeholder, not semantic).
///
/// Identical inputs map to identical unit vectors; nothing else is promised.
/// Image inputs hash the file bytes, so missing files still fail.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// Embed raw bytes.
    pub fn embed_bytes(&self, bytes: &[u8]) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimension];
        if self.dimension == 0 {
            return embedding;
        }
        // FNV-1a over a running state spreads each byte across buckets
        let mut state: u64 = 0xcbf2_9ce4_8422_2325;
        for &b in bytes {
            state ^= b as u64;
            state = state.wrapping_mul(0x0100_0000_01b3);
            let bucket = (state % self.dimension as u64) as usize;
            let sign = if (state >> 63) == 0 { 1.0 } else { -1.0 };
            embedding[bucket] += sign * (b as f32 + 1.0) / 256.0;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for val in &mut embedding {
                *val /= norm;
            }
        }
        embedding
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, input: &EmbedInput) -> Result<Vec<f32>> {
        match input {
            EmbedInput::Text(text) => Ok(self.embed_bytes(text.as_bytes())),
            EmbedInput::Image(path) => {
                let bytes = read_image(path).await?;
                Ok(self.embed_bytes(&bytes))
            }
        }
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "hash"
    }
}
