//! imgvec vector store client.
//!
//! A thin facade over a vector database: collections of `(id, vector, metadata)`
//! records, batch upsert, similarity index construction and filtered
//! nearest-neighbor queries. Two backends: an in-process store (optionally
//! persisted to disk) and Postgres with the pgvector extension.

pub mod distance;
pub mod error;
pub mod filter;
pub mod index;
pub mod memory;
pub mod postgres;
pub mod traits;

pub use distance::Measure;
pub use error::{Result, VectorDbError};
pub use filter::Filter;
pub use index::{IndexConfig, IndexMethod};
pub use memory::{MemoryCollection, MemoryStore};
pub use postgres::{PgCollection, PgStore};
pub use traits::{Query, QueryMatch, VectorCollection, VectorStore, MAX_QUERY_LIMIT};

/// Validate a collection name: 1..=63 chars of `[A-Za-z0-9_-]`.
pub fn validate_collection_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= 63
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(VectorDbError::InvalidName(name.to_string()))
    }
}
