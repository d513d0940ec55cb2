//! CLIP ViT-B/32 run in-process. Image and text towers share one 512-d space.

use async_trait::async_trait;
use fastembed::{
    EmbeddingModel, ImageEmbedding, ImageEmbeddingModel, ImageInitOptions, TextEmbedding, TextInitOptions,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

use crate::error::{EmbedError, Result};
use crate::traits::{check_dimension, EmbedInput, Embedder};

pub const CLIP_DIMENSION: usize = 512;

pub struct LocalClipEmbedder {
    image_model: Arc<Mutex<ImageEmbedding>>,
    text_model: Arc<Mutex<TextEmbedding>>,
}

impl LocalClipEmbedder {
    /// Load both CLIP towers. Weights are downloaded to the fastembed cache on first use.
    pub fn new() -> Result<Self> {
        info!("loading CLIP ViT-B/32 image and text models");
        let image_model = ImageEmbedding::try_new(ImageInitOptions::new(ImageEmbeddingModel::ClipVitB32))
            .map_err(|e| EmbedError::Model(e.to_string()))?;
        let text_model = TextEmbedding::try_new(TextInitOptions::new(EmbeddingModel::ClipVitB32))
            .map_err(|e| EmbedError::Model(e.to_string()))?;
        Ok(Self {
            image_model: Arc::new(Mutex::new(image_model)),
            text_model: Arc::new(Mutex::new(text_model)),
        })
    }
}

fn l2_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

#[async_trait]
impl Embedder for LocalClipEmbedder {
    async fn embed(&self, input: &EmbedInput) -> Result<Vec<f32>> {
        let vectors = match input.clone() {
            EmbedInput::Image(path) => {
                if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                    return Err(EmbedError::ImageNotFound { path });
                }
                let model = self.image_model.clone();
                tokio::task::spawn_blocking(move || model.lock().embed(vec![path], None))
                    .await
                    .map_err(|e| EmbedError::Model(e.to_string()))?
            }
            EmbedInput::Text(text) => {
                let model = self.text_model.clone();
                tokio::task::spawn_blocking(move || model.lock().embed(vec![text], None))
                    .await
                    .map_err(|e| EmbedError::Model(e.to_string()))?
            }
        }
        .map_err(|e| EmbedError::Model(e.to_string()))?;

        let vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| EmbedError::Model("model returned no embedding".into()))?;
        let vector = l2_normalize(vector);
        check_dimension(&vector, CLIP_DIMENSION)?;
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        CLIP_DIMENSION
    }

    fn name(&self) -> &str {
        "clip-vit-b-32"
    }
}
