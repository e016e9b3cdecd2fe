//! Long-term paper conversation memory.
//!
//! This module defines the capability interface for the store that holds
//! prior chat turns about each paper. Lookups are similarity searches over
//! each record's searchable text, not exact key matches: the conversation
//! layer queries with `"title: <title>"` and takes the best match, so a
//! near-title query still resolves to the right record.
//!
//! The store makes no transaction guarantees. Real deployments can put a
//! vector database behind this trait; the bundled [`lexical`] store keeps
//! everything in process memory.

pub mod lexical;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::PaperThreadRecord;

/// Errors that can occur during memory store operations.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// The store is unreachable or rejected the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A record could not be serialized or deserialized
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Other unexpected errors
    #[error("Memory store error: {0}")]
    Other(String),
}

/// Result type for memory store operations.
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Trait for paper thread stores.
///
/// # Best-match contract
///
/// `similarity_search` returns up to `top_k` records ordered by descending
/// similarity of the query text against each record's searchable text
/// (`"Title: <title>\nSummary: <summary>"`). An empty result means no
/// record resembled the query; there is no similarity floor, so callers
/// that need one must apply it themselves.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Find the records most similar to the query text.
    ///
    /// # Arguments
    /// * `query` - Free text to match against record searchable text
    /// * `top_k` - Maximum number of records to return
    ///
    /// # Errors
    /// Returns `MemoryError` if the store cannot be reached or queried
    async fn similarity_search(
        &self,
        query: &str,
        top_k: usize,
    ) -> MemoryResult<Vec<PaperThreadRecord>>;

    /// Insert or replace the record for a paper.
    ///
    /// Records are replaced when an existing record carries the same title;
    /// otherwise a new record is created.
    ///
    /// # Errors
    /// Returns `MemoryError` if the write fails
    async fn upsert(&self, record: PaperThreadRecord) -> MemoryResult<()>;
}
