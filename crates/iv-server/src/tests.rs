use super::*;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use iv_core::{EmbeddingConfig, EmbeddingProvider, ImageSearchConfig, ImagesConfig, StoreBackend};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

async fn test_state(dir: &TempDir) -> AppState {
    for (i, name) in ["one.jpg", "two.jpg", "three.jpg", "four.jpg"].iter().enumerate() {
        let img = image::RgbImage::from_pixel(4, 4 + i as u32, image::Rgb([10 * i as u8, 80, 160]));
        img.save(dir.path().join(name)).unwrap();
    }
    let mut config = ImageSearchConfig::default();
    config.store.backend = StoreBackend::Memory;
    config.embedding = EmbeddingConfig {
        provider: EmbeddingProvider::Hash,
        dimension: 16,
        ..Default::default()
    };
    config.images = ImagesConfig {
        dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    AppState::new(ImageSearch::from_config(config).await.unwrap())
}

async fn send(state: &AppState, method: &str, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
    let resp = app_with_state(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;
    let (status, body) = send(&state, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["collection"], "image_vectors");
    assert_eq!(body["embedder"], "hash");
}

#[tokio::test]
async fn test_collection_not_found_before_seed() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;
    let (status, body) = send(&state, "GET", "/api/v1/collections/image_vectors").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_seed_then_collection_info() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;

    let (status, body) = send(&state, "POST", "/api/v1/seed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
    assert_eq!(body["ids"][0], "one.jpg");

    let (status, body) = send(&state, "GET", "/api/v1/collections/image_vectors").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "image_vectors");
    assert_eq!(body["dimension"], 16);
    assert_eq!(body["count"], 4);
}

#[tokio::test]
async fn test_search_after_seed() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;
    send(&state, "POST", "/api/v1/seed").await;

    let (status, body) = send(&state, "GET", "/api/v1/search?q=bike%20near%20a%20wall&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "bike near a wall");
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    for r in results {
        assert_eq!(r["metadata"]["type"], "jpg");
        assert_eq!(r["width"], 4);
    }
    assert!(results[0]["distance"].as_f64().unwrap() <= results[1]["distance"].as_f64().unwrap());
}

#[tokio::test]
async fn test_search_defaults_to_one_result() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;
    send(&state, "POST", "/api/v1/seed").await;

    let (status, body) = send(&state, "GET", "/api/v1/search?q=sunset").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_missing_query() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;
    let (status, body) = send(&state, "GET", "/api/v1/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_search_limit_out_of_range() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;
    send(&state, "POST", "/api/v1/seed").await;
    let (status, _) = send(&state, "GET", "/api/v1/search?q=cat&limit=5000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_empty_collection() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;
    state
        .search
        .store()
        .get_or_create_collection("image_vectors", 16)
        .await
        .unwrap();
    let (status, body) = send(&state, "GET", "/api/v1/search?q=cat").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]["message"].as_str().unwrap().contains("image_vectors"));
}

#[tokio::test]
async fn test_seed_missing_image() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;
    std::fs::remove_file(dir.path().join("two.jpg")).unwrap();
    let (status, body) = send(&state, "POST", "/api/v1/seed").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]["message"].as_str().unwrap().contains("Bad file name"));
}

#[tokio::test]
async fn test_unknown_route() {
    let dir = TempDir::new().unwrap();
    let state = test_state(&dir).await;
    let (status, _) = send(&state, "GET", "/api/v1/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bind_accepts_hostname() {
    let listener = bind("localhost", 0).await.unwrap();
    assert!(listener.local_addr().unwrap().ip().is_loopback());

    let listener = bind("127.0.0.1", 0).await.unwrap();
    assert_ne!(listener.local_addr().unwrap().port(), 0);
}
