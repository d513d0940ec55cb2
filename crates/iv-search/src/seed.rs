use iv_core::{ImagesConfig, Record};
use iv_embed::Embedder;
use iv_vectordb::{IndexConfig, VectorStore};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::search::SEARCH_TYPE;

/// Outcome of a seed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedReport {
    pub collection: String,
    pub dimension: usize,
    /// Record ids written, in seed order.
    pub ids: Vec<String>,
    /// Records in the collection after the run.
    pub total: usize,
}

/// Whether `path` names a JPEG file (`.jpg`/`.jpeg`, any case).
pub fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false)
}

/// Record id for an image: its file name.
pub fn record_id(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Embed each image in order, upsert them as one batch, then build the index.
///
/// Every record is tagged `type: "jpg"`; a configured file that is not a JPEG
/// fails the run before anything is written. The first embedding failure
/// aborts the run as well.
pub async fn seed(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    collection: &str,
    images: &ImagesConfig,
) -> Result<SeedReport> {
    let paths = images.paths();
    if let Some(path) = paths.iter().find(|p| !is_jpeg(p)) {
        return Err(PipelineError::UnsupportedImage { path: path.clone() });
    }

    let coll = store.get_or_create_collection(collection, embedder.dimension()).await?;

    let mut records = Vec::with_capacity(images.files.len());
    for path in paths {
        let vector = embedder.embed_image(&path).await?;
        let id = record_id(&path);
        debug!(id = %id, "embedded image");
        records.push(Record::new(id, vector).with_metadata("type", SEARCH_TYPE));
    }

    coll.upsert(&records).await?;
    coll.create_index(&IndexConfig::default()).await?;

    let report = SeedReport {
        collection: collection.to_string(),
        dimension: coll.dimension(),
        ids: records.into_iter().map(|r| r.id).collect(),
        total: coll.count().await?,
    };
    info!(collection, seeded = report.ids.len(), total = report.total, "seed complete");
    Ok(report)
}
