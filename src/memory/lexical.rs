//! In-process lexical memory store.
//!
//! Backs the [`MemoryStore`](super::MemoryStore) trait with a plain vector
//! of records guarded by an async lock, scoring similarity with the same
//! TF-IDF machinery the paper ranker uses. Suitable as the default store
//! for a single-process deployment and as the stand-in for an external
//! vector database in tests.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{MemoryResult, MemoryStore};
use crate::models::PaperThreadRecord;
use crate::ranker::{content_tokens, pair_similarity};

/// Vector-of-records store with lexical similarity search.
#[derive(Default)]
pub struct LexicalMemoryStore {
    records: RwLock<Vec<PaperThreadRecord>>,
}

impl LexicalMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl MemoryStore for LexicalMemoryStore {
    async fn similarity_search(
        &self,
        query: &str,
        top_k: usize,
    ) -> MemoryResult<Vec<PaperThreadRecord>> {
        let query_tokens = content_tokens(query);
        let records = self.records.read().await;

        let mut scored: Vec<(f64, &PaperThreadRecord)> = records
            .iter()
            .map(|record| {
                let record_tokens = content_tokens(&record.searchable_text());
                (pair_similarity(&query_tokens, &record_tokens), record)
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        debug!(
            query,
            matches = scored.len(),
            "memory similarity search complete"
        );

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn upsert(&self, record: PaperThreadRecord) -> MemoryResult<()> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.title == record.title) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatTurn;

    fn record(title: &str, summary: &str) -> PaperThreadRecord {
        PaperThreadRecord {
            title: title.to_string(),
            summary: summary.to_string(),
            turns: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_best_match_first() {
        let store = LexicalMemoryStore::new();
        store
            .upsert(record("Neural Machine Translation", "sequence models"))
            .await
            .unwrap();
        store
            .upsert(record("Sourdough Microbiology", "yeast cultures"))
            .await
            .unwrap();

        let results = store
            .similarity_search("title: Neural Machine Translation", 2)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Neural Machine Translation");
    }

    #[tokio::test]
    async fn test_top_k_limits_results() {
        let store = LexicalMemoryStore::new();
        for i in 0..5 {
            store
                .upsert(record(&format!("Paper {i} on graphs"), "graphs"))
                .await
                .unwrap();
        }
        let results = store.similarity_search("title: graphs", 2).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_title() {
        let store = LexicalMemoryStore::new();
        store.upsert(record("Attention", "v1 summary")).await.unwrap();

        let mut updated = record("Attention", "v1 summary");
        updated.turns.push(ChatTurn::user("what changed?"));
        store.upsert(updated).await.unwrap();

        assert_eq!(store.len().await, 1);
        let results = store.similarity_search("title: Attention", 1).await.unwrap();
        assert_eq!(results[0].turns.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty() {
        let store = LexicalMemoryStore::new();
        let results = store.similarity_search("title: anything", 3).await.unwrap();
        assert!(results.is_empty());
    }
}
