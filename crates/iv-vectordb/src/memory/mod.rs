//! In-process vector store, modeled on a project of named collections.

mod collection;

pub use collection::MemoryCollection;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{Result, VectorDbError};
use crate::traits::{VectorCollection, VectorStore};
use crate::validate_collection_name;

/// Collections held in memory, optionally persisted one directory per collection.
pub struct MemoryStore {
    path: Option<PathBuf>,
    collections: RwLock<HashMap<String, Arc<MemoryCollection>>>,
}

impl MemoryStore {
    /// Create a volatile store.
    pub fn new() -> Self {
        Self {
            path: None,
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Create a persistent store, loading any collections already under `path`.
    pub fn with_path(path: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&path)?;
        let store = Self {
            path: Some(path),
            collections: RwLock::new(HashMap::new()),
        };
        store.load_existing()?;
        Ok(store)
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.read().contains_key(name)
    }

    fn load_existing(&self) -> Result<()> {
        let Some(base) = &self.path else { return Ok(()) };
        for entry in std::fs::read_dir(base)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            match MemoryCollection::open(entry.path()) {
                Ok(coll) => {
                    self.collections.write().insert(coll.name().to_string(), Arc::new(coll));
                }
                Err(e) => warn!(path = %entry.path().display(), error = %e, "skipping unreadable collection"),
            }
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn get_or_create_collection(&self, name: &str, dimension: usize) -> Result<Arc<dyn VectorCollection>> {
        validate_collection_name(name)?;
        if dimension == 0 {
            return Err(VectorDbError::InvalidArgument("dimension must be positive".into()));
        }
        let mut colls = self.collections.write();
        if !colls.contains_key(name) {
            let coll = match &self.path {
                // A directory skipped at load time is reopened so its error surfaces here
                Some(base) if base.join(name).exists() => MemoryCollection::open(base.join(name))?,
                Some(base) => {
                    info!(collection = name, dimension, "created collection");
                    MemoryCollection::with_path(name, dimension, base.join(name))?
                }
                None => {
                    info!(collection = name, dimension, "created collection");
                    MemoryCollection::new(name, dimension)
                }
            };
            colls.insert(name.to_string(), Arc::new(coll));
        }

        let coll = colls
            .get(name)
            .cloned()
            .ok_or_else(|| VectorDbError::CollectionNotFound(name.to_string()))?;
        if coll.dimension() != dimension {
            return Err(VectorDbError::MismatchedDimension {
                name: name.to_string(),
                existing: coll.dimension(),
                requested: dimension,
            });
        }
        Ok(coll)
    }

    async fn get_collection(&self, name: &str) -> Result<Arc<dyn VectorCollection>> {
        self.collections
            .read()
            .get(name)
            .map(|c| c.clone() as Arc<dyn VectorCollection>)
            .ok_or_else(|| VectorDbError::CollectionNotFound(name.to_string()))
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let removed = self.collections.write().remove(name);
        if let Some(coll) = removed {
            if let Some(path) = coll.path() {
                std::fs::remove_dir_all(path)?;
            }
            info!(collection = name, "deleted collection");
        }
        Ok(())
    }
}
