use anyhow::Context;
use iv_core::{ImageSearchConfig, ServerConfig};
use iv_search::{render, ImageSearch};
use std::path::Path;
use tracing::info;

async fn pipeline(config: ImageSearchConfig) -> anyhow::Result<ImageSearch> {
    ImageSearch::from_config(config)
        .await
        .context("failed to initialize store or embedder")
}

pub async fn seed(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = ImageSearchConfig::load(config_path)?;
    let search = pipeline(config).await?;
    let report = search.seed().await?;
    println!(
        "Seeded {} image(s) into {} ({} records, dimension {})",
        report.ids.len(),
        report.collection,
        report.total,
        report.dimension
    );
    Ok(())
}

pub async fn search(config_path: Option<&Path>, query: &str, limit: usize) -> anyhow::Result<()> {
    let config = ImageSearchConfig::load(config_path)?;
    let search = pipeline(config).await?;
    info!(query, limit, "searching");
    let hits = search.search_top(query, limit).await?;
    for hit in &hits {
        println!("{}", render(hit));
    }
    Ok(())
}

pub async fn serve(config_path: Option<&Path>, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let mut config = ImageSearchConfig::load(config_path)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    let ServerConfig { host, port } = config.server.clone();
    let search = pipeline(config).await?;
    iv_server::serve(search, &host, port).await
}
