use iv_core::{StoreBackend, StoreConfig};
use iv_vectordb::{MemoryStore, PgStore, VectorStore};
use std::sync::Arc;
use tracing::info;

use crate::error::Result;

/// Open the backend selected by `config.backend`.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn VectorStore>> {
    let store: Arc<dyn VectorStore> = match config.backend {
        StoreBackend::Postgres => {
            info!("connecting to postgres vector store");
            Arc::new(PgStore::connect(&config.connection, config.max_connections).await?)
        }
        StoreBackend::Memory => match &config.path {
            Some(path) => {
                info!(path = %path.display(), "opening persistent memory store");
                Arc::new(MemoryStore::with_path(path.clone())?)
            }
            None => {
                info!("using volatile memory store");
                Arc::new(MemoryStore::new())
            }
        },
    };
    Ok(store)
}
