//! arXiv search provider.
//!
//! Queries the arXiv export API and parses the Atom XML feed. quick-xml is
//! used because Atom namespaces make regex parsing brittle. The query shape
//! is fixed to the ten most recently submitted papers matching the topic.

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use super::{SearchError, SearchProvider, SearchResults};
use crate::models::Paper;

/// arXiv export API endpoint.
const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";

/// Papers requested per search.
const MAX_RESULTS: u32 = 10;

/// arXiv Atom API provider.
pub struct ArxivProvider {
    client: reqwest::Client,
}

impl Default for ArxivProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ArxivProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SearchProvider for ArxivProvider {
    async fn search(&self, topic: &str) -> SearchResults<Vec<Paper>> {
        let response = self
            .client
            .get(ARXIV_API_URL)
            .query(&[
                ("search_query", format!("all:{topic}")),
                ("start", "0".to_string()),
                ("max_results", MAX_RESULTS.to_string()),
                ("sortBy", "submittedDate".to_string()),
                ("sortOrder", "descending".to_string()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::ServiceError(format!(
                "arXiv returned {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::NetworkError(e.to_string()))?;

        let papers = parse_atom_feed(&body)?;
        debug!(topic, count = papers.len(), "arXiv search complete");
        Ok(papers)
    }

    fn name(&self) -> &str {
        "arxiv"
    }
}

/// Parse an arXiv Atom feed into papers.
///
/// Extracts title, summary, and the entry id URL from each `<entry>`.
/// Papers are assigned 1-based ids in feed order. Whitespace inside title
/// and summary text (arXiv wraps them across lines) is collapsed.
pub fn parse_atom_feed(xml: &str) -> SearchResults<Vec<Paper>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut papers = Vec::new();
    let mut buf = Vec::new();

    let mut in_entry = false;
    let mut text = String::new();
    let mut title = String::new();
    let mut summary = String::new();
    let mut link = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name.ends_with("entry") {
                    in_entry = true;
                    title.clear();
                    summary.clear();
                    link = None;
                }
                text.clear();
            }
            Ok(Event::Text(t)) => {
                if in_entry {
                    let chunk = t.unescape().map_err(|e| SearchError::ParseError(e.to_string()))?;
                    text.push_str(&chunk);
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if in_entry {
                    let value = collapse_whitespace(&text);
                    if name.ends_with("title") {
                        title = value;
                    } else if name.ends_with("summary") {
                        summary = value;
                    } else if name.ends_with("id") && link.is_none() {
                        link = (!value.is_empty()).then_some(value);
                    } else if name.ends_with("entry") {
                        in_entry = false;
                        papers.push(Paper {
                            id: Some(papers.len() as i64 + 1),
                            title: std::mem::take(&mut title),
                            summary: std::mem::take(&mut summary),
                            link: link.take(),
                        });
                    }
                    text.clear();
                }
            }
            Ok(_) => {}
            Err(e) => return Err(SearchError::ParseError(e.to_string())),
        }
        buf.clear();
    }

    Ok(papers)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
