//! Remote registry client interface.
//!
//! The registry exposes two capabilities the pipeline relies on: a name
//! search returning candidate laws and a structured fetch returning the
//! full article list of one law. The wire format is the registry's
//! business; implementations hand the core normalized Rust types. Single
//! element vs. list ambiguities in the upstream XML are normalized to
//! ordered sequences at the parsing boundary, never at call sites.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SourceResult;

/// One candidate law returned by the registry search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawCandidate {
    /// Formal Korean name (법령명한글).
    pub name: String,

    /// Short name (법령약칭명), when the registry carries one.
    pub abbreviation: Option<String>,

    /// Registry identifier used for the structured fetch.
    pub id: String,

    /// Whether the candidate is flagged currently in force (현행).
    pub is_current: bool,
}

impl LawCandidate {
    /// All name fields a citation may have been written against.
    pub fn name_fields(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.abbreviation.as_deref())
    }
}

/// A full structured law document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredLaw {
    pub name: String,
    /// Articles in document order.
    pub articles: Vec<RegistryArticle>,
}

/// One article of a structured law.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryArticle {
    /// Article number (조문번호).
    pub article_no: u32,

    /// Branch number (조문가지번호) for inserted articles, e.g. 제14조의2.
    pub branch_no: Option<u32>,

    /// Article heading (조문제목), when present.
    pub heading: Option<String>,

    /// Full article text: the article body followed by its clauses and
    /// subclauses, newline separated.
    pub body: String,
}

impl RegistryArticle {
    /// Article key, e.g. "제14조의2".
    pub fn article_key(&self) -> String {
        match self.branch_no {
            Some(b) => format!("제{}조의{}", self.article_no, b),
            None => format!("제{}조", self.article_no),
        }
    }
}

/// Remote registry client.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Search the registry for laws matching a name.
    ///
    /// An empty vector means the registry answered and found nothing;
    /// errors mean the registry could not be asked.
    async fn search(&self, name: &str) -> SourceResult<Vec<LawCandidate>>;

    /// Fetch the full structured document for a registry id.
    ///
    /// A response carrying the registry's not-found marker must surface as
    /// [`SourceError::RegistryNotFound`](crate::error::SourceError), not as
    /// an empty document.
    async fn fetch_structured(&self, id: &str) -> SourceResult<StructuredLaw>;
}
