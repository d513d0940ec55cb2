use super::*;
use crate::seed::{is_jpeg, record_id};
use async_trait::async_trait;
use iv_core::{EmbeddingConfig, EmbeddingProvider, ImagesConfig, Record, StoreBackend, StoreConfig};
use iv_embed::{EmbedError, EmbedInput, HashEmbedder};
use iv_vectordb::{MemoryStore, VectorDbError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Embedder with a fixed table: images keyed by file name, text by exact string.
struct TableEmbedder {
    images: HashMap<String, Vec<f32>>,
    texts: HashMap<String, Vec<f32>>,
}

impl TableEmbedder {
    fn new() -> Self {
        let images = [
            ("one.jpg", vec![1.0, 0.0, 0.0]),
            ("two.jpg", vec![0.0, 1.0, 0.0]),
            ("three.jpg", vec![0.0, 0.0, 1.0]),
            ("four.jpg", vec![0.7, 0.7, 0.0]),
            ("five.png", vec![0.0, 0.1, 1.0]),
        ];
        let texts = [
            ("red bicycle", vec![0.9, 0.1, 0.0]),
            ("green field", vec![0.1, 0.9, 0.05]),
            ("blue sky", vec![0.0, 0.1, 1.0]),
        ];
        Self {
            images: images.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            texts: texts.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }
}

#[async_trait]
impl Embedder for TableEmbedder {
    async fn embed(&self, input: &EmbedInput) -> iv_embed::Result<Vec<f32>> {
        match input {
            EmbedInput::Image(path) => {
                if !path.exists() {
                    return Err(EmbedError::ImageNotFound { path: path.clone() });
                }
                let name = path.file_name().unwrap().to_string_lossy().to_string();
                self.images
                    .get(&name)
                    .cloned()
                    .ok_or_else(|| EmbedError::Model(format!("no vector for {name}")))
            }
            EmbedInput::Text(text) => self
                .texts
                .get(text)
                .cloned()
                .ok_or_else(|| EmbedError::Model(format!("no vector for {text}"))),
        }
    }

    fn dimension(&self) -> usize {
        3
    }

    fn name(&self) -> &str {
        "table"
    }
}

/// Write small real JPEGs so rendering can read pixel dimensions.
fn write_images(dir: &Path, names: &[&str]) {
    for (i, name) in names.iter().enumerate() {
        let img = image::RgbImage::from_pixel(8 + i as u32, 6, image::Rgb([200, 30, 30]));
        img.save(dir.join(name)).unwrap();
    }
}

fn config_for(dir: &Path) -> ImageSearchConfig {
    let mut config = ImageSearchConfig::default();
    config.images = ImagesConfig {
        dir: dir.to_path_buf(),
        ..Default::default()
    };
    config.store.backend = StoreBackend::Memory;
    config
}

fn pipeline(dir: &Path) -> ImageSearch {
    ImageSearch::new(
        Arc::new(MemoryStore::new()),
        Arc::new(TableEmbedder::new()),
        config_for(dir),
    )
}

// ========== Helpers ==========

#[test]
fn test_is_jpeg() {
    assert!(is_jpeg(Path::new("images/one.jpg")));
    assert!(is_jpeg(Path::new("images/ONE.JPG")));
    assert!(is_jpeg(Path::new("images/one.jpeg")));
    assert!(!is_jpeg(Path::new("images/five.png")));
    assert!(!is_jpeg(Path::new("images/noext")));
}

#[test]
fn test_record_id_is_file_name() {
    assert_eq!(record_id(Path::new("images/one.jpg")), "one.jpg");
    assert_eq!(record_id(Path::new("two.jpg")), "two.jpg");
}

// ========== Seed ==========

#[tokio::test]
async fn test_seed_stores_one_record_per_image() {
    let dir = TempDir::new().unwrap();
    write_images(dir.path(), &["one.jpg", "two.jpg", "three.jpg", "four.jpg"]);
    let p = pipeline(dir.path());

    let report = p.seed().await.unwrap();
    assert_eq!(report.collection, "image_vectors");
    assert_eq!(report.dimension, 3);
    assert_eq!(report.ids, vec!["one.jpg", "two.jpg", "three.jpg", "four.jpg"]);
    assert_eq!(report.total, 4);

    let coll = p.store().get_collection("image_vectors").await.unwrap();
    let ids: Vec<String> = report.ids.clone();
    let records = coll.fetch(&ids).await.unwrap();
    assert_eq!(records.len(), 4);
    for r in &records {
        assert_eq!(r.metadata.len(), 1);
        assert_eq!(r.metadata["type"], "jpg");
    }
    assert_eq!(records[0].vector, vec![1.0, 0.0, 0.0]);
}

#[tokio::test]
async fn test_reseed_overwrites() {
    let dir = TempDir::new().unwrap();
    write_images(dir.path(), &["one.jpg", "two.jpg", "three.jpg", "four.jpg"]);
    let p = pipeline(dir.path());

    p.seed().await.unwrap();
    let again = p.seed().await.unwrap();
    assert_eq!(again.total, 4);
}

#[tokio::test]
async fn test_seed_missing_image_aborts() {
    let dir = TempDir::new().unwrap();
    write_images(dir.path(), &["one.jpg", "two.jpg", "four.jpg"]);
    let p = pipeline(dir.path());

    match p.seed().await.unwrap_err() {
        PipelineError::Embedding(EmbedError::ImageNotFound { path }) => {
            assert_eq!(path, dir.path().join("three.jpg"));
        }
        other => panic!("unexpected error: {other}"),
    }
    // Batch upsert happens after all embeddings, so nothing was written
    let coll = p.store().get_collection("image_vectors").await.unwrap();
    assert_eq!(coll.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_seed_rejects_non_jpeg_before_writing() {
    let dir = TempDir::new().unwrap();
    write_images(dir.path(), &["one.jpg", "five.png"]);
    let mut config = config_for(dir.path());
    config.images.files = vec!["one.jpg".into(), "five.png".into()];
    let p = ImageSearch::new(Arc::new(MemoryStore::new()), Arc::new(TableEmbedder::new()), config);

    match p.seed().await.unwrap_err() {
        PipelineError::UnsupportedImage { path } => assert_eq!(path, dir.path().join("five.png")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(p.store().list_collections().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_seed_tags_jpeg_variants_as_jpg() {
    let dir = TempDir::new().unwrap();
    write_images(dir.path(), &["one.JPEG"]);
    let mut config = config_for(dir.path());
    config.images.files = vec!["one.JPEG".into()];
    let p = ImageSearch::new(
        Arc::new(MemoryStore::new()),
        Arc::new(HashEmbedder::new(3)),
        config,
    );

    p.seed().await.unwrap();
    let hit = p.search("anything").await.unwrap();
    assert_eq!(hit.id, "one.JPEG");
    assert_eq!(hit.metadata["type"], "jpg");
}

#[tokio::test]
async fn test_seed_dimension_conflict() {
    let dir = TempDir::new().unwrap();
    write_images(dir.path(), &["one.jpg", "two.jpg", "three.jpg", "four.jpg"]);
    let p = pipeline(dir.path());
    p.store().get_or_create_collection("image_vectors", 8).await.unwrap();

    assert!(matches!(
        p.seed().await,
        Err(PipelineError::Store(VectorDbError::MismatchedDimension { existing: 8, requested: 3, .. }))
    ));
}

// ========== Search ==========

#[tokio::test]
async fn test_search_returns_nearest() {
    let dir = TempDir::new().unwrap();
    write_images(dir.path(), &["one.jpg", "two.jpg", "three.jpg", "four.jpg"]);
    let p = pipeline(dir.path());
    p.seed().await.unwrap();

    let hit = p.search("red bicycle").await.unwrap();
    assert_eq!(hit.id, "one.jpg");
    assert_eq!(hit.path, dir.path().join("one.jpg"));
    assert_eq!(hit.metadata["type"], "jpg");
    assert!(hit.distance >= 0.0 && hit.distance < 0.1);

    assert_eq!(p.search("green field").await.unwrap().id, "two.jpg");
    assert_eq!(p.search("  blue sky ").await.unwrap().id, "three.jpg");
}

#[tokio::test]
async fn test_search_top_ordering() {
    let dir = TempDir::new().unwrap();
    write_images(dir.path(), &["one.jpg", "two.jpg", "three.jpg", "four.jpg"]);
    let p = pipeline(dir.path());
    p.seed().await.unwrap();

    let hits = p.search_top("red bicycle", 3).await.unwrap();
    let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["one.jpg", "four.jpg", "two.jpg"]);
    assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
}

#[tokio::test]
async fn test_search_skips_non_jpg() {
    let dir = TempDir::new().unwrap();
    write_images(dir.path(), &["one.jpg", "two.jpg", "three.jpg", "four.jpg"]);
    let p = pipeline(dir.path());
    p.seed().await.unwrap();

    // A png closer to the query than any jpg
    let coll = p.store().get_collection("image_vectors").await.unwrap();
    coll.upsert(&[Record::new("five.png", vec![0.0, 0.1, 1.0]).with_metadata("type", "png")])
        .await
        .unwrap();

    assert_eq!(p.search("blue sky").await.unwrap().id, "three.jpg");
}

#[tokio::test]
async fn test_search_empty_collection() {
    let dir = TempDir::new().unwrap();
    let p = pipeline(dir.path());
    p.store().get_or_create_collection("image_vectors", 3).await.unwrap();

    assert!(matches!(
        p.search("red bicycle").await,
        Err(PipelineError::EmptyResult(name)) if name == "image_vectors"
    ));
}

#[tokio::test]
async fn test_search_missing_collection() {
    let dir = TempDir::new().unwrap();
    let p = pipeline(dir.path());
    assert!(matches!(
        p.search("red bicycle").await,
        Err(PipelineError::Store(VectorDbError::CollectionNotFound(_)))
    ));
}

#[tokio::test]
async fn test_search_empty_query() {
    let dir = TempDir::new().unwrap();
    let p = pipeline(dir.path());
    assert!(matches!(p.search("   ").await, Err(PipelineError::EmptyQuery)));
}

#[tokio::test]
async fn test_search_limit_out_of_range() {
    let dir = TempDir::new().unwrap();
    write_images(dir.path(), &["one.jpg", "two.jpg", "three.jpg", "four.jpg"]);
    let p = pipeline(dir.path());
    p.seed().await.unwrap();
    assert!(matches!(
        p.search_top("red bicycle", 0).await,
        Err(PipelineError::Store(VectorDbError::InvalidArgument(_)))
    ));
}

// ========== Render ==========

#[tokio::test]
async fn test_render_reads_dimensions() {
    let dir = TempDir::new().unwrap();
    write_images(dir.path(), &["one.jpg", "two.jpg", "three.jpg", "four.jpg"]);
    let p = pipeline(dir.path());
    p.seed().await.unwrap();

    let rendered = render(&p.search("red bicycle").await.unwrap());
    assert_eq!(rendered.id, "one.jpg");
    assert_eq!(rendered.dimensions, Some((8, 6)));
    let text = rendered.to_string();
    assert!(text.starts_with("one.jpg (distance "));
    assert!(text.contains("size: 8x6"));
}

#[test]
fn test_render_unreadable_file() {
    let hit = SearchHit {
        id: "gone.jpg".into(),
        distance: 0.25,
        metadata: Default::default(),
        path: PathBuf::from("/definitely/not/here/gone.jpg"),
    };
    let rendered = render(&hit);
    assert_eq!(rendered.dimensions, None);
    assert!(rendered.to_string().contains("size: unreadable"));
}

// ========== Store factory / persistence ==========

#[tokio::test]
async fn test_seed_then_search_across_runs() {
    let images = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    write_images(images.path(), &["one.jpg", "two.jpg", "three.jpg", "four.jpg"]);

    let mut config = config_for(images.path());
    config.store = StoreConfig {
        backend: StoreBackend::Memory,
        path: Some(data.path().to_path_buf()),
        ..Default::default()
    };

    let first = ImageSearch::new(
        open_store(&config.store).await.unwrap(),
        Arc::new(TableEmbedder::new()),
        config.clone(),
    );
    first.seed().await.unwrap();
    drop(first);

    let second = ImageSearch::new(
        open_store(&config.store).await.unwrap(),
        Arc::new(TableEmbedder::new()),
        config,
    );
    assert_eq!(second.search("green field").await.unwrap().id, "two.jpg");
}

#[tokio::test]
async fn test_from_config_hash_memory() {
    let dir = TempDir::new().unwrap();
    write_images(dir.path(), &["one.jpg", "two.jpg", "three.jpg", "four.jpg"]);
    let mut config = config_for(dir.path());
    config.embedding = EmbeddingConfig {
        provider: EmbeddingProvider::Hash,
        dimension: 16,
        ..Default::default()
    };

    let p = ImageSearch::from_config(config).await.unwrap();
    assert_eq!(p.embedder().name(), "hash");
    let report = p.seed().await.unwrap();
    assert_eq!(report.dimension, 16);
    assert_eq!(report.total, 4);
    // Hash vectors carry no meaning, but a search still yields a jpg
    let hit = p.search("anything").await.unwrap();
    assert_eq!(hit.metadata["type"], "jpg");
}
