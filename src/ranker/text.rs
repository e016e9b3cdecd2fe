//! Text normalization for the similarity ranker.
//!
//! Turns raw title/summary text into the content-bearing token stream the
//! TF-IDF scoring runs over: lowercased, punctuation stripped, function
//! words removed, and each surviving token reduced to a base form.

use std::collections::HashSet;
use std::sync::OnceLock;

/// Closed-class English function words plus high-frequency fillers.
///
/// Removing these approximates restricting the stream to content-bearing
/// words (nouns, adjectives, verbs): determiners, prepositions, pronouns,
/// conjunctions, and auxiliaries are all excluded here.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an",
    "and", "any", "are", "as", "at", "be", "because", "been", "before", "being",
    "below", "between", "both", "but", "by", "can", "cannot", "could", "did",
    "do", "does", "doing", "down", "during", "each", "either", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here",
    "hers", "herself", "him", "himself", "his", "how", "however", "i", "if",
    "in", "into", "is", "it", "its", "itself", "just", "may", "me", "might",
    "more", "most", "must", "my", "myself", "neither", "no", "nor", "not",
    "of", "off", "on", "once", "only", "or", "other", "our", "ours",
    "ourselves", "out", "over", "own", "same", "shall", "she", "should", "so",
    "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through",
    "to", "too", "under", "until", "up", "upon", "very", "was", "we", "were",
    "what", "when", "where", "which", "while", "who", "whom", "why", "will",
    "with", "would", "you", "your", "yours", "yourself", "yourselves",
];

fn stop_word_set() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

/// Reduce a token to a base form by suffix stripping.
///
/// This is a deliberately small English lemmatizer: plural and inflectional
/// suffixes are removed with length guards so short words are left alone.
/// It is deterministic and vocabulary-free, which is all the ranker needs
/// for matching title/summary text against itself.
pub fn lemmatize(token: &str) -> String {
    let t = token.strip_suffix("'s").unwrap_or(token);

    if t.len() > 4 {
        if let Some(stem) = t.strip_suffix("ies") {
            return format!("{stem}y");
        }
        if let Some(stem) = t.strip_suffix("ing") {
            if stem.len() >= 3 {
                return stem.to_string();
            }
        }
    }
    if t.len() > 3 {
        for suffix in ["sses", "xes", "ches", "shes", "zes"] {
            if let Some(stem) = t.strip_suffix(suffix) {
                // keep the consonant cluster, drop only the "es"
                return format!("{}{}", stem, &suffix[..suffix.len() - 2]);
            }
        }
        if let Some(stem) = t.strip_suffix("ed") {
            if stem.len() >= 3 {
                return stem.to_string();
            }
        }
    }
    if t.len() > 3 && t.ends_with('s') && !t.ends_with("ss") && !t.ends_with("us") {
        return t[..t.len() - 1].to_string();
    }
    t.to_string()
}

/// Extract the content-bearing tokens from raw text.
///
/// Applies, in order: lowercasing, splitting on any non-alphanumeric
/// character (which strips punctuation), dropping single-character tokens
/// and tokens containing digits (version strings, identifiers), stop-word
/// removal, and lemmatization.
pub fn content_tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 1)
        .filter(|t| t.chars().all(|c| c.is_alphabetic()))
        .filter(|t| !stop_word_set().contains(t))
        .map(lemmatize)
        .collect()
}
