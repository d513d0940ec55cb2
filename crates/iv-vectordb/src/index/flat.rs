use std::collections::HashMap;

use crate::distance::{self, Measure};
use crate::error::{Result, VectorDbError};

/// Brute-force (flat) vector index.
/// Exact nearest-neighbor search by scanning all vectors.
pub struct FlatIndex {
    dimension: usize,
    measure: Measure,
    ids: Vec<String>,
    vectors: Vec<Vec<f32>>,
    id_to_idx: HashMap<String, usize>,
}

impl FlatIndex {
    pub fn new(dimension: usize, measure: Measure) -> Self {
        Self::with_capacity(dimension, measure, 0)
    }

    /// Create with pre-allocated capacity.
    pub fn with_capacity(dimension: usize, measure: Measure, capacity: usize) -> Self {
        Self {
            dimension,
            measure,
            ids: Vec::with_capacity(capacity),
            vectors: Vec::with_capacity(capacity),
            id_to_idx: HashMap::with_capacity(capacity),
        }
    }

    pub fn measure(&self) -> Measure {
        self.measure
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn insert(&mut self, id: &str, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(VectorDbError::DimensionMismatch {
                expected: self.dimension,
                got: vector.len(),
            });
        }
        let mut vec = vector.to_vec();
        // Cosine ranks on normalized vectors
        if self.measure == Measure::CosineDistance {
            distance::normalize_vector(&mut vec);
        }
        if let Some(&idx) = self.id_to_idx.get(id) {
            self.vectors[idx] = vec;
        } else {
            self.id_to_idx.insert(id.to_string(), self.ids.len());
            self.ids.push(id.to_string());
            self.vectors.push(vec);
        }
        Ok(())
    }

    pub fn delete(&mut self, id: &str) {
        if let Some(idx) = self.id_to_idx.remove(id) {
            // Swap-remove for O(1) deletion
            let last = self.ids.len() - 1;
            if idx != last {
                self.ids.swap(idx, last);
                self.vectors.swap(idx, last);
                self.id_to_idx.insert(self.ids[idx].clone(), idx);
            }
            self.ids.pop();
            self.vectors.pop();
        }
    }

    /// Every indexed id with its distance to `query`, nearest first.
    pub fn ranked(&self, query: &[f32]) -> Result<Vec<(&str, f32)>> {
        if query.len() != self.dimension {
            return Err(VectorDbError::DimensionMismatch {
                expected: self.dimension,
                got: query.len(),
            });
        }
        let mut q = query.to_vec();
        if self.measure == Measure::CosineDistance {
            distance::normalize_vector(&mut q);
        }
        let mut scored: Vec<(&str, f32)> = self
            .ids
            .iter()
            .zip(self.vectors.iter())
            .map(|(id, v)| (id.as_str(), self.measure.distance(&q, v)))
            .collect();
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored)
    }

    /// Top-k nearest ids.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<(String, f32)>> {
        let mut ranked = self.ranked(query)?;
        ranked.truncate(top_k);
        Ok(ranked.into_iter().map(|(id, d)| (id.to_string(), d)).collect())
    }
}
