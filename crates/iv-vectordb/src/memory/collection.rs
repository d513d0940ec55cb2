use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use iv_core::Record;

use crate::error::{Result, VectorDbError};
use crate::index::{FlatIndex, IndexConfig};
use crate::traits::{check_dimensions, Query, QueryMatch, VectorCollection};

const MANIFEST_FILE: &str = "collection_config.json";
const RECORDS_FILE: &str = "records.json";

/// Persisted collection header.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Manifest {
    name: String,
    dimension: usize,
    #[serde(default)]
    index: Option<IndexConfig>,
}

struct BuiltIndex {
    config: IndexConfig,
    index: FlatIndex,
}

/// In-process collection with an optional on-disk copy.
///
/// Every mutation is written through to `path` when one is set.
pub struct MemoryCollection {
    name: String,
    dimension: usize,
    records: RwLock<HashMap<String, Record>>,
    index: RwLock<Option<BuiltIndex>>,
    path: Option<PathBuf>,
}

impl MemoryCollection {
    /// Create a new in-memory collection.
    pub fn new(name: &str, dimension: usize) -> Self {
        Self {
            name: name.to_string(),
            dimension,
            records: RwLock::new(HashMap::new()),
            index: RwLock::new(None),
            path: None,
        }
    }

    /// Create a persistent collection rooted at `path`.
    ///
    /// Fails if `path` already holds a collection; use [`MemoryCollection::open`] for that.
    pub fn with_path(name: &str, dimension: usize, path: PathBuf) -> Result<Self> {
        if path.join(MANIFEST_FILE).exists() {
            return Err(VectorDbError::CollectionAlreadyExists(format!(
                "{name} at {}",
                path.display()
            )));
        }
        fs::create_dir_all(&path)?;
        let mut coll = Self::new(name, dimension);
        coll.path = Some(path);
        coll.persist()?;
        Ok(coll)
    }

    /// Open a collection previously written to `path`.
    pub fn open(path: PathBuf) -> Result<Self> {
        let manifest: Manifest = read_json(&path.join(MANIFEST_FILE))?;
        let coll = Self {
            name: manifest.name,
            dimension: manifest.dimension,
            records: RwLock::new(HashMap::new()),
            index: RwLock::new(None),
            path: Some(path.clone()),
        };

        let records_path = path.join(RECORDS_FILE);
        if records_path.exists() {
            let records: Vec<Record> = read_json(&records_path)?;
            let mut map = coll.records.write();
            for r in records {
                map.insert(r.id.clone(), r);
            }
        }
        if let Some(cfg) = manifest.index {
            coll.build_index(cfg)?;
        }
        debug!(collection = %coll.name, records = coll.len(), "recovered collection");
        Ok(coll)
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn has_index(&self) -> bool {
        self.index.read().is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn build_index(&self, config: IndexConfig) -> Result<()> {
        let records = self.records.read();
        let mut index = FlatIndex::with_capacity(self.dimension, config.measure, records.len());
        for r in records.values() {
            index.insert(&r.id, &r.vector)?;
        }
        *self.index.write() = Some(BuiltIndex { config, index });
        Ok(())
    }

    fn upsert_records(&self, records: &[Record]) -> Result<()> {
        check_dimensions(records, self.dimension)?;
        {
            let mut map = self.records.write();
            let mut index = self.index.write();
            for r in records {
                if let Some(built) = index.as_mut() {
                    built.index.insert(&r.id, &r.vector)?;
                }
                map.insert(r.id.clone(), r.clone());
            }
        }
        self.persist()
    }

    fn delete_records(&self, ids: &[String]) -> Result<()> {
        {
            let mut map = self.records.write();
            let mut index = self.index.write();
            for id in ids {
                if map.remove(id).is_some() {
                    if let Some(built) = index.as_mut() {
                        built.index.delete(id);
                    }
                }
            }
        }
        self.persist()
    }

    fn create_index_sync(&self, config: &IndexConfig) -> Result<()> {
        if self.has_index() && !config.replace {
            return Err(VectorDbError::InvalidArgument(format!(
                "collection {} already has an index and replace is false",
                self.name
            )));
        }
        let mut cfg = config.clone();
        cfg.method = cfg.method.resolve();
        self.build_index(cfg)?;
        self.persist()
    }

    fn run_query(&self, query: &Query) -> Result<Vec<QueryMatch>> {
        query.validate(self.dimension)?;
        let records = self.records.read();
        let index = self.index.read();

        let ranked: Vec<(String, f32)> = match index.as_ref() {
            Some(built) if built.config.measure == query.measure => built
                .index
                .ranked(&query.vector)?
                .into_iter()
                .map(|(id, d)| (id.to_string(), d))
                .collect(),
            _ => {
                warn!(
                    collection = %self.name,
                    measure = %query.measure,
                    "query does not have a covering index, scanning all records"
                );
                let mut scored: Vec<(String, f32)> = records
                    .values()
                    .map(|r| (r.id.clone(), query.measure.distance(&query.vector, &r.vector)))
                    .collect();
                scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
                scored
            }
        };

        let mut data = Vec::new();
        for (id, distance) in ranked {
            if data.len() >= query.limit {
                break;
            }
            let Some(record) = records.get(&id) else { continue };
            if let Some(filter) = &query.filter {
                if !filter.matches(&record.metadata) {
                    continue;
                }
            }
            data.push(QueryMatch {
                id,
                distance: query.include_value.then_some(distance),
                metadata: query.include_metadata.then(|| record.metadata.clone()),
            });
        }
        Ok(data)
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else { return Ok(()) };
        fs::create_dir_all(path)?;

        // Lock order: records before index
        let records = self.records.read();
        let manifest = Manifest {
            name: self.name.clone(),
            dimension: self.dimension,
            index: self.index.read().as_ref().map(|b| b.config.clone()),
        };
        write_json(&path.join(MANIFEST_FILE), &manifest)?;

        let mut list: Vec<&Record> = records.values().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        write_json(&path.join(RECORDS_FILE), &list)
    }
}

#[async_trait]
impl VectorCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn upsert(&self, records: &[Record]) -> Result<()> {
        self.upsert_records(records)
    }

    async fn fetch(&self, ids: &[String]) -> Result<Vec<Record>> {
        let records = self.records.read();
        Ok(ids.iter().filter_map(|id| records.get(id).cloned()).collect())
    }

    async fn delete(&self, ids: &[String]) -> Result<()> {
        self.delete_records(ids)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.len())
    }

    async fn create_index(&self, config: &IndexConfig) -> Result<()> {
        self.create_index_sync(config)
    }

    async fn query(&self, query: &Query) -> Result<Vec<QueryMatch>> {
        self.run_query(query)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| VectorDbError::Serialization(format!("{}: {e}", path.display())))
}

/// Atomic write: temp file then rename.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| VectorDbError::Serialization(e.to_string()))?;
    let tmp_path = path.with_extension("tmp");
    let result = (|| -> std::io::Result<()> {
        let mut f = fs::File::create(&tmp_path)?;
        f.write_all(&bytes)?;
        f.sync_all()?;
        fs::rename(&tmp_path, path)
    })();
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}
