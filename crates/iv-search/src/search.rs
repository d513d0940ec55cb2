use iv_core::Metadata;
use iv_embed::Embedder;
use iv_vectordb::{Filter, Query, VectorStore};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Only records with this `type` are returned.
pub const SEARCH_TYPE: &str = "jpg";

/// One match from the store, with the image path resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub distance: f32,
    pub metadata: Metadata,
    pub path: PathBuf,
}

/// Nearest `jpg` records to `text`, at most `limit`.
pub async fn search(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    collection: &str,
    text: &str,
    limit: usize,
    images_dir: &Path,
) -> Result<Vec<SearchHit>> {
    let text = text.trim();
    if text.is_empty() {
        return Err(PipelineError::EmptyQuery);
    }
    let coll = store.get_collection(collection).await?;
    let vector = embedder.embed_text(text).await?;

    let query = Query::new(vector)
        .limit(limit)
        .filter(Filter::eq("type", SEARCH_TYPE))
        .include_value(true)
        .include_metadata(true);
    let matches = coll.query(&query).await?;
    debug!(collection, hits = matches.len(), "query returned");
    if matches.is_empty() {
        return Err(PipelineError::EmptyResult(collection.to_string()));
    }

    Ok(matches
        .into_iter()
        .map(|m| SearchHit {
            path: images_dir.join(&m.id),
            id: m.id,
            distance: m.distance.unwrap_or(f32::NAN),
            metadata: m.metadata.unwrap_or_default(),
        })
        .collect())
}

/// Displayable form of a hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rendered {
    pub id: String,
    pub distance: f32,
    pub path: PathBuf,
    /// Pixel width and height, when the file can be read as an image.
    pub dimensions: Option<(u32, u32)>,
}

pub fn render(hit: &SearchHit) -> Rendered {
    Rendered {
        id: hit.id.clone(),
        distance: hit.distance,
        path: hit.path.clone(),
        dimensions: image::image_dimensions(&hit.path).ok(),
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (distance {:.4})", self.id, self.distance)?;
        write!(f, "\n  path: {}", self.path.display())?;
        match self.dimensions {
            Some((w, h)) => write!(f, "\n  size: {w}x{h}"),
            None => write!(f, "\n  size: unreadable"),
        }
    }
}
