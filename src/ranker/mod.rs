//! Paper similarity ranking.
//!
//! Given a target paper and a list of candidates, this module produces an
//! ordered top-N recommendation list using lexical TF-IDF feature vectors
//! over each paper's title and summary.
//!
//! Scoring is pairwise: each candidate is weighted against a two-document
//! corpus consisting of just the target and that candidate, rather than
//! against the candidate set as a whole. This matches the behavior the
//! recommendation endpoint has always had and is kept intentionally; see
//! DESIGN.md for the trade-off discussion.
//!
//! # Usage
//!
//! ```
//! use paper_chat::models::Paper;
//! use paper_chat::ranker::rank;
//!
//! let target = Paper::new("Graph Networks", "learning on graphs");
//! let candidates = vec![Paper::new("GNN Survey", "a survey of learning on graphs")];
//! let ranked = rank(&target, &candidates, 5);
//! assert_eq!(ranked.len(), 1);
//! ```

mod text;

pub use text::{content_tokens, lemmatize};

use std::collections::{HashMap, HashSet};

use crate::models::{Paper, RankedPaper};

/// Number of recommendations returned when the caller does not ask for a
/// specific count.
pub const DEFAULT_TOP_N: usize = 5;

/// Rank `candidates` by lexical similarity to `target`.
///
/// Returns at most `top_n` papers, ordered by descending cosine similarity
/// of their TF-IDF vectors against the target. The sort is stable: exact
/// ties keep the original candidate order. A candidate carrying the same id
/// as the target is excluded before scoring, and an empty candidate list
/// yields an empty result.
pub fn rank(target: &Paper, candidates: &[Paper], top_n: usize) -> Vec<RankedPaper> {
    let target_tokens = content_tokens(&paper_text(target));

    let mut ranked: Vec<RankedPaper> = candidates
        .iter()
        .filter(|c| !is_same_paper(target, c))
        .map(|c| {
            let candidate_tokens = content_tokens(&paper_text(c));
            let score = pair_similarity(&target_tokens, &candidate_tokens);
            RankedPaper {
                paper: c.clone(),
                score,
            }
        })
        .collect();

    // stable sort keeps original order for tied scores
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(top_n);
    ranked
}

/// The text a paper is ranked on: title and summary joined by a space.
fn paper_text(paper: &Paper) -> String {
    format!("{} {}", paper.title, paper.summary)
}

/// Two papers are the same only when both carry an id and the ids match.
fn is_same_paper(target: &Paper, candidate: &Paper) -> bool {
    matches!((target.id, candidate.id), (Some(t), Some(c)) if t == c)
}

/// Cosine similarity between TF-IDF vectors built over the two-document
/// corpus {target, candidate}.
///
/// Uses smoothed inverse document frequency, `ln((1 + n) / (1 + df)) + 1`,
/// so terms shared by both documents still carry positive weight and two
/// identical token streams score exactly 1.0. If either document produces
/// an all-zero vector (e.g. its text was entirely stop-words), the
/// similarity is defined as 0 rather than dividing by zero.
pub fn pair_similarity(target_tokens: &[String], candidate_tokens: &[String]) -> f64 {
    if target_tokens.is_empty() || candidate_tokens.is_empty() {
        return 0.0;
    }

    let target_tf = term_frequencies(target_tokens);
    let candidate_tf = term_frequencies(candidate_tokens);

    // document frequency within the two-document corpus
    let n_docs = 2.0f64;
    let vocabulary: HashSet<&str> = target_tf.keys().chain(candidate_tf.keys()).copied().collect();

    let mut dot = 0.0f64;
    let mut target_norm = 0.0f64;
    let mut candidate_norm = 0.0f64;

    for term in vocabulary {
        let in_target = target_tf.contains_key(term);
        let in_candidate = candidate_tf.contains_key(term);
        let df = (in_target as u32 + in_candidate as u32) as f64;
        let idf = ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0;

        let tw = target_tf.get(term).copied().unwrap_or(0.0) * idf;
        let cw = candidate_tf.get(term).copied().unwrap_or(0.0) * idf;

        dot += tw * cw;
        target_norm += tw * tw;
        candidate_norm += cw * cw;
    }

    if target_norm == 0.0 || candidate_norm == 0.0 {
        return 0.0;
    }
    (dot / (target_norm.sqrt() * candidate_norm.sqrt())).clamp(0.0, 1.0)
}

/// Raw term counts for one document.
fn term_frequencies(tokens: &[String]) -> HashMap<&str, f64> {
    let mut tf: HashMap<&str, f64> = HashMap::new();
    for token in tokens {
        *tf.entry(token.as_str()).or_insert(0.0) += 1.0;
    }
    tf
}
