//! The response record — the unit that is cached and returned.

use serde::{Deserialize, Serialize};

use super::node::DocumentNode;

/// Which retrieval tier produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Structured fetch from the remote registry
    Registry,
    /// Scraped from the rendered registry page
    Scrape,
    /// Local static snapshot
    Snapshot,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Registry => "registry",
            Source::Scrape => "scrape",
            Source::Snapshot => "snapshot",
        }
    }
}

/// The resolved outcome for one citation lookup.
///
/// Every request resolves to one of these, including terminal failures;
/// `structure` is `None` whenever `found` is false. The field set is wire
/// compatible and must not grow core fields silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub found: bool,

    /// Canonical form of the requested citation, e.g. "제14조의2 제1항".
    pub canonical_citation: String,

    /// Matched text, `None` when nothing was found.
    pub content: Option<String>,

    /// Decomposed tree of the matched node, `None` when `found` is false.
    pub structure: Option<DocumentNode>,

    /// Every article citation seen while scanning the registry document,
    /// for next-step guidance on misses.
    pub available_citations: Vec<String>,

    /// Canonical reference URL; always present, even on failure.
    pub reference_url: String,

    pub source: Source,

    /// Human-readable outcome or guidance.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Source::Registry).unwrap(),
            "\"registry\""
        );
        assert_eq!(Source::Snapshot.as_str(), "snapshot");
    }

    #[test]
    fn test_record_field_names_are_camel_case() {
        let record = ResponseRecord {
            found: false,
            canonical_citation: "제1조".to_string(),
            content: None,
            structure: None,
            available_citations: vec![],
            reference_url: "https://example.com".to_string(),
            source: Source::Snapshot,
            message: "not found".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("canonicalCitation").is_some());
        assert!(json.get("availableCitations").is_some());
        assert!(json.get("referenceUrl").is_some());
        assert!(json.get("structure").unwrap().is_null());
    }
}
