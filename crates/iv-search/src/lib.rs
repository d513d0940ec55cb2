//! Seed and search routines over an embedder and a vector store.
//!
//! Seeding embeds a fixed list of images and upserts them into a collection;
//! searching embeds a text query and returns the nearest `jpg` record.

pub mod error;
pub mod search;
pub mod seed;
pub mod store;

pub use error::{PipelineError, Result};
pub use search::{render, Rendered, SearchHit};
pub use seed::SeedReport;
pub use store::open_store;

use iv_core::ImageSearchConfig;
use iv_embed::Embedder;
use iv_vectordb::VectorStore;
use std::sync::Arc;

/// A store, an embedder and the configuration that ties them together.
#[derive(Clone)]
pub struct ImageSearch {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    config: ImageSearchConfig,
}

impl ImageSearch {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>, config: ImageSearchConfig) -> Self {
        Self { store, embedder, config }
    }

    /// Connect the configured store and build the configured embedder.
    pub async fn from_config(config: ImageSearchConfig) -> Result<Self> {
        let store = open_store(&config.store).await?;
        let embedder = iv_embed::from_config(&config.embedding)?;
        Ok(Self::new(store, embedder, config))
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    pub fn config(&self) -> &ImageSearchConfig {
        &self.config
    }

    pub fn collection(&self) -> &str {
        &self.config.store.collection
    }

    /// Embed and store every configured image.
    pub async fn seed(&self) -> Result<SeedReport> {
        seed::seed(
            self.store.as_ref(),
            self.embedder.as_ref(),
            self.collection(),
            &self.config.images,
        )
        .await
    }

    /// Best `jpg` match for `text`.
    pub async fn search(&self, text: &str) -> Result<SearchHit> {
        let mut hits = self.search_top(text, 1).await?;
        Ok(hits.remove(0))
    }

    /// Up to `limit` `jpg` matches for `text`, nearest first. Never empty on success.
    pub async fn search_top(&self, text: &str, limit: usize) -> Result<Vec<SearchHit>> {
        search::search(
            self.store.as_ref(),
            self.embedder.as_ref(),
            self.collection(),
            text,
            limit,
            &self.config.images.dir,
        )
        .await
    }
}

#[cfg(test)]
mod tests;
