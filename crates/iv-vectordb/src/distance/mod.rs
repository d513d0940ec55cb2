//! Distance measures for vector similarity search.
//!
//! All measures are distances: lower means more similar. They line up with
//! the pgvector operators so both backends rank identically.

use std::fmt;

/// Supported distance measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// `1 - cosine_similarity`, in [0, 2].
    #[default]
    CosineDistance,
    /// Euclidean distance.
    L2Distance,
    /// Negative inner product.
    MaxInnerProduct,
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CosineDistance => write!(f, "cosine_distance"),
            Self::L2Distance => write!(f, "l2_distance"),
            Self::MaxInnerProduct => write!(f, "max_inner_product"),
        }
    }
}

impl Measure {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cosine_distance" | "cosine" | "cos" => Some(Self::CosineDistance),
            "l2_distance" | "l2" | "euclidean" => Some(Self::L2Distance),
            "max_inner_product" | "ip" | "dot" | "inner_product" => Some(Self::MaxInnerProduct),
            _ => None,
        }
    }

    /// Compute the distance between two vectors of equal length.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::CosineDistance => 1.0 - cosine_similarity(a, b),
            Self::L2Distance => l2_squared(a, b).sqrt(),
            Self::MaxInnerProduct => -inner_product(a, b),
        }
    }

    /// pgvector distance operator.
    pub fn pg_operator(&self) -> &'static str {
        match self {
            Self::CosineDistance => "<=>",
            Self::L2Distance => "<->",
            Self::MaxInnerProduct => "<#>",
        }
    }

    /// pgvector index operator class.
    pub fn pg_ops_class(&self) -> &'static str {
        match self {
            Self::CosineDistance => "vector_cosine_ops",
            Self::L2Distance => "vector_l2_ops",
            Self::MaxInnerProduct => "vector_ip_ops",
        }
    }
}

/// Compute inner product (dot product) of two vectors.
#[inline]
pub fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Compute L2 squared distance.
#[inline]
pub fn l2_squared(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(x, y)| {
        let d = x - y;
        d * d
    }).sum()
}

/// Compute cosine similarity (returns value in [-1, 1]).
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot = inner_product(a, b);
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Normalize a vector in-place (L2 normalization).
pub fn normalize_vector(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
