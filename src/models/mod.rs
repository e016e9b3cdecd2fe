//! Core data models for the paper chat backend.
//!
//! This module contains the fundamental data structures used across the
//! application: paper metadata, chat turns, and the persisted association
//! between a paper and its conversation history.

use serde::{Deserialize, Serialize};

/// Core metadata for a research paper.
///
/// Papers are fetched from external search APIs (arXiv, Scholar) and are
/// immutable once fetched. The `id` is the 1-based position the paper held
/// in its search result page, not a database key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
    /// Position identifier assigned when the paper was fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Paper title
    pub title: String,

    /// Abstract / summary text
    pub summary: String,

    /// Link to the paper's landing page or PDF, when the source provides one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Paper {
    /// Create a paper with just a title and summary.
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            summary: summary.into(),
            link: None,
        }
    }
}

/// Author of a chat turn.
///
/// Serialized in lowercase so it round-trips the OpenAI-style wire format
/// ("system" / "user" / "assistant").
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    /// Who authored the turn
    pub role: ChatRole,

    /// Message text
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// Persisted association between a paper and its stored conversation turns.
///
/// The record is keyed weakly by paper title: lookups go through a
/// similarity search over the record's searchable text rather than an exact
/// key match, so near-title queries still resolve. Records are created on
/// the first chat about a paper and appended to on every subsequent turn;
/// deletion is a store concern, not handled here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperThreadRecord {
    /// Title of the paper this thread belongs to
    pub title: String,

    /// Summary of the paper, stored so the record is self-describing
    pub summary: String,

    /// Conversation turns in creation order
    pub turns: Vec<ChatTurn>,
}

impl PaperThreadRecord {
    /// The text a similarity search runs against.
    ///
    /// Format is fixed: `"Title: <title>\nSummary: <summary>"`.
    pub fn searchable_text(&self) -> String {
        format!("Title: {}\nSummary: {}", self.title, self.summary)
    }
}

/// A paper paired with its similarity score, as returned by the ranker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedPaper {
    /// The candidate paper
    pub paper: Paper,

    /// Cosine similarity against the target, in [0, 1]
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_role_wire_format() {
        assert_eq!(serde_json::to_string(&ChatRole::System).unwrap(), "\"system\"");
        assert_eq!(serde_json::to_string(&ChatRole::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&ChatRole::Assistant).unwrap(),
            "\"assistant\""
        );

        let role: ChatRole = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(role, ChatRole::Assistant);
    }

    #[test]
    fn test_chat_turn_round_trip() {
        let turn = ChatTurn::user("what is the main contribution?");
        let json = serde_json::to_string(&turn).unwrap();
        let back: ChatTurn = serde_json::from_str(&json).unwrap();
        assert_eq!(back, turn);
    }

    #[test]
    fn test_searchable_text_format() {
        let record = PaperThreadRecord {
            title: "Attention Is All You Need".to_string(),
            summary: "We propose the Transformer.".to_string(),
            turns: Vec::new(),
        };
        assert_eq!(
            record.searchable_text(),
            "Title: Attention Is All You Need\nSummary: We propose the Transformer."
        );
    }
}
