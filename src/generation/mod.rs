//! Chat generation provider abstraction and implementations.
//!
//! This module defines the interface for relaying an assembled message list
//! to an external large-language-model chat-completion API. The abstraction
//! lets the conversation layer swap between vendors (or a test double)
//! without changing how contexts are assembled.

pub mod groq;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::ChatTurn;

/// Errors that can occur during chat generation.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Network, auth, or rate-limit failure talking to the API
    #[error("API request failed: {0}")]
    ApiError(String),

    /// Configuration error (e.g. missing API key)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The API answered but the payload was not in the expected shape
    #[error("Malformed response: {0}")]
    InvalidResponse(String),
}

/// Result type for generation operations.
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Trait for chat-completion providers.
///
/// Implementors relay an ordered message list to a generation service and
/// return the assistant's reply text. Sampling parameters are fixed by the
/// implementation; callers only control the messages.
///
/// No retry or timeout logic lives behind this trait beyond whatever the
/// underlying HTTP client defaults to.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Send the ordered message list and return the reply text.
    ///
    /// # Arguments
    /// * `messages` - Full ordered context, system turn first
    ///
    /// # Errors
    /// Returns `GenerationError` on any transport, auth, or payload problem
    async fn complete(&self, messages: &[ChatTurn]) -> GenerationResult<String>;

    /// Model identifier used by this provider, for logging.
    fn model_name(&self) -> &str;
}
