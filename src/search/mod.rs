//! Paper search providers.
//!
//! This module defines the interface for fetching paper metadata from
//! external search services and includes implementations for the arXiv
//! Atom API and a Scholar-style JSON API.
//!
//! Providers return opaque pass-through payloads reduced to the fields the
//! rest of the system needs (title, summary, link); no attempt is made to
//! reproduce or re-rank the upstream search ordering.

pub mod arxiv;
pub mod scholar;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Paper;

/// Errors that can occur when fetching papers from a search service.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Network or connection error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The service answered with a non-success status
    #[error("Service error: {0}")]
    ServiceError(String),

    /// Failed to parse the response payload
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid configuration (e.g. missing API key)
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for search operations.
pub type SearchResults<T> = Result<T, SearchError>;

/// Trait for paper search services.
///
/// Implementations handle the specifics of one upstream API: building the
/// query URL, performing the request, and extracting paper fields from the
/// response. Papers come back in the order the upstream returned them, with
/// 1-based position ids assigned.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search for papers matching a free-text topic.
    ///
    /// # Errors
    /// Returns `SearchError` if the request or parsing fails
    async fn search(&self, topic: &str) -> SearchResults<Vec<Paper>>;

    /// Human-readable provider name, for logging.
    fn name(&self) -> &str;
}
