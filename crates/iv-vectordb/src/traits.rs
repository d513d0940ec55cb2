use async_trait::async_trait;
use iv_core::{Metadata, Record};
use std::sync::Arc;

use crate::distance::Measure;
use crate::error::{Result, VectorDbError};
use crate::filter::Filter;
use crate::index::IndexConfig;

/// Upper bound on `Query::limit`.
pub const MAX_QUERY_LIMIT: usize = 1000;

/// A similarity query against one collection.
#[derive(Debug, Clone)]
pub struct Query {
    pub vector: Vec<f32>,
    pub limit: usize,
    pub filter: Option<Filter>,
    pub measure: Measure,
    pub include_value: bool,
    pub include_metadata: bool,
}

impl Query {
    pub fn new(vector: Vec<f32>) -> Self {
        Self {
            vector,
            limit: 10,
            filter: None,
            measure: Measure::default(),
            include_value: false,
            include_metadata: false,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn measure(mut self, measure: Measure) -> Self {
        self.measure = measure;
        self
    }

    pub fn include_value(mut self, yes: bool) -> Self {
        self.include_value = yes;
        self
    }

    pub fn include_metadata(mut self, yes: bool) -> Self {
        self.include_metadata = yes;
        self
    }

    /// Check limit bounds and vector length against the collection dimension.
    pub fn validate(&self, dimension: usize) -> Result<()> {
        if self.limit == 0 || self.limit > MAX_QUERY_LIMIT {
            return Err(VectorDbError::InvalidArgument(format!(
                "limit must be between 1 and {MAX_QUERY_LIMIT}, got {}",
                self.limit
            )));
        }
        if self.vector.len() != dimension {
            return Err(VectorDbError::DimensionMismatch {
                expected: dimension,
                got: self.vector.len(),
            });
        }
        Ok(())
    }
}

/// One query hit. `distance` and `metadata` are populated only when requested.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct QueryMatch {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// A named, dimension-typed set of records.
#[async_trait]
pub trait VectorCollection: Send + Sync {
    fn name(&self) -> &str;

    fn dimension(&self) -> usize;

    /// Insert or overwrite records by id.
    async fn upsert(&self, records: &[Record]) -> Result<()>;

    /// Fetch records by id; unknown ids are skipped.
    async fn fetch(&self, ids: &[String]) -> Result<Vec<Record>>;

    /// Delete records by id; unknown ids are ignored.
    async fn delete(&self, ids: &[String]) -> Result<()>;

    async fn count(&self) -> Result<usize>;

    /// Build the similarity index.
    async fn create_index(&self, config: &IndexConfig) -> Result<()>;

    /// Nearest neighbors, ordered by ascending distance.
    async fn query(&self, query: &Query) -> Result<Vec<QueryMatch>>;
}

/// Entry point to a vector database.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Return the named collection, creating it with `dimension` if absent.
    async fn get_or_create_collection(&self, name: &str, dimension: usize) -> Result<Arc<dyn VectorCollection>>;

    async fn get_collection(&self, name: &str) -> Result<Arc<dyn VectorCollection>>;

    async fn list_collections(&self) -> Result<Vec<String>>;

    async fn delete_collection(&self, name: &str) -> Result<()>;
}

pub(crate) fn check_dimensions(records: &[Record], dimension: usize) -> Result<()> {
    for r in records {
        if r.vector.len() != dimension {
            return Err(VectorDbError::DimensionMismatch {
                expected: dimension,
                got: r.vector.len(),
            });
        }
    }
    Ok(())
}
