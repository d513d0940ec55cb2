//! Index configuration and the in-process flat index.

mod flat;

pub use flat::FlatIndex;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::distance::Measure;

/// Index build method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexMethod {
    /// Let the backend choose; resolves to HNSW.
    #[default]
    Auto,
    Hnsw,
    IvfFlat,
}

impl IndexMethod {
    pub fn resolve(self) -> Self {
        match self {
            Self::Auto => Self::Hnsw,
            other => other,
        }
    }
}

impl fmt::Display for IndexMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Hnsw => write!(f, "hnsw"),
            Self::IvfFlat => write!(f, "ivfflat"),
        }
    }
}

/// Index configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    pub method: IndexMethod,
    pub measure: Measure,
    /// Drop an existing index first instead of failing.
    pub replace: bool,
    /// HNSW max connections per layer.
    pub m: usize,
    /// HNSW candidate list size during construction.
    pub ef_construction: usize,
    /// IVFFlat list count; derived from the record count when unset.
    pub lists: Option<usize>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            method: IndexMethod::Auto,
            measure: Measure::CosineDistance,
            replace: true,
            m: 16,
            ef_construction: 64,
            lists: None,
        }
    }
}

impl IndexConfig {
    /// IVFFlat list count for a collection of `n_records`.
    pub fn ivfflat_lists(&self, n_records: usize) -> usize {
        if let Some(lists) = self.lists {
            return lists.max(1);
        }
        if n_records < 1_000_000 {
            (n_records / 1000).max(30)
        } else {
            (n_records as f64).sqrt() as usize
        }
    }
}
