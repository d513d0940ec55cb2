use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use iv_search::{render, SeedReport};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

pub fn collection_routes() -> Router<AppState> {
    Router::new().route("/api/v1/collections/{name}", get(collection_info))
}

pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/search", get(search))
        .route("/api/v1/seed", post(seed))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "collection": state.search.collection(),
        "embedder": state.search.embedder().name(),
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

async fn collection_info(State(state): State<AppState>, Path(name): Path<String>) -> Result<Json<Value>, ApiError> {
    let coll = state.search.store().get_collection(&name).await?;
    let count = coll.count().await?;
    Ok(Json(json!({
        "name": coll.name(),
        "dimension": coll.dimension(),
        "count": count,
    })))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<Value>, ApiError> {
    let text = params.q.unwrap_or_default();
    let hits = state.search.search_top(&text, params.limit.unwrap_or(1)).await?;
    let results: Vec<Value> = hits
        .iter()
        .map(|hit| {
            let rendered = render(hit);
            json!({
                "id": hit.id,
                "distance": hit.distance,
                "path": hit.path.display().to_string(),
                "metadata": hit.metadata,
                "width": rendered.dimensions.map(|d| d.0),
                "height": rendered.dimensions.map(|d| d.1),
            })
        })
        .collect();
    Ok(Json(json!({ "query": text.trim(), "results": results })))
}

async fn seed(State(state): State<AppState>) -> Result<Json<SeedReport>, ApiError> {
    let report = state.search.seed().await?;
    info!(collection = %report.collection, seeded = report.ids.len(), "seeded via api");
    Ok(Json(report))
}
