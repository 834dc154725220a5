//! Local snapshot store, the retrieval tier of last resort.
//!
//! Snapshots are JSON files on disk, one per law, named by canonical law
//! name. The schema mirrors the statute hierarchy with localized keys:
//!
//! ```json
//! {
//!   "조문": {
//!     "제17조": {
//!       "조문": "제17조(가해학생에 대한 조치) ...",
//!       "항": {
//!         "1항": { "내용": "① ...", "호": { "2호": "접촉의 금지" } }
//!       }
//!     }
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::SourceResult;
use crate::traits::snapshot::SnapshotStore;
use crate::types::citation::Citation;

/// Snapshot store over a directory of per-law JSON files.
pub struct JsonSnapshotStore {
    dir: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[derive(Debug, Deserialize)]
struct SnapshotDocument {
    #[serde(rename = "조문", default)]
    articles: HashMap<String, SnapshotArticle>,
}

#[derive(Debug, Deserialize)]
struct SnapshotArticle {
    #[serde(rename = "조문", default)]
    text: String,
    #[serde(rename = "항", default)]
    clauses: HashMap<String, SnapshotClause>,
}

#[derive(Debug, Deserialize)]
struct SnapshotClause {
    #[serde(rename = "내용", default)]
    text: String,
    #[serde(rename = "호", default)]
    items: HashMap<String, String>,
}

#[async_trait]
impl SnapshotStore for JsonSnapshotStore {
    async fn lookup(&self, canonical_name: &str, citation: &Citation) -> SourceResult<Option<String>> {
        let path = self.dir.join(format!("{canonical_name}.json"));
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no snapshot file for law");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let document: SnapshotDocument = serde_json::from_str(&raw)?;
        Ok(lookup_in_document(&document, citation))
    }
}

/// Walk the snapshot hierarchy to the deepest level the citation names
/// and the file provides, falling back level by level.
fn lookup_in_document(document: &SnapshotDocument, citation: &Citation) -> Option<String> {
    let article_key = citation.article_key()?;
    let article = document.articles.get(&article_key)?;

    let Some(clause_no) = citation.clause_no else {
        return nonempty(&article.text);
    };
    let Some(clause) = article.clauses.get(&format!("{clause_no}항")) else {
        return nonempty(&article.text);
    };

    if let Some(subclause_no) = citation.subclause_no {
        if let Some(item) = clause.items.get(&format!("{subclause_no}호")) {
            if !item.is_empty() {
                // Restore the full marker chain so decomposition yields the
                // clause node and the subclause node under it.
                let scoped = with_subclause_heading(item, subclause_no);
                return Some(with_clause_heading(&scoped, clause_no));
            }
        }
    }
    nonempty(&clause.text)
        .map(|text| with_clause_heading(&text, clause_no))
        .or_else(|| nonempty(&article.text))
}

fn nonempty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Level-scoped snapshot text often omits its own markers; restore them so
/// the decomposition pass can title each node correctly. A clause marker is
/// the spelled-out form or a circled glyph; a subclause marker is the
/// spelled-out form or a numbered item ("2.").
fn with_clause_heading(text: &str, clause_no: u32) -> String {
    let trimmed = text.trim();
    let marked = trimmed.starts_with(&format!("제{clause_no}항"))
        || trimmed
            .chars()
            .next()
            .is_some_and(|c| ('①'..='⑳').contains(&c));
    if marked {
        trimmed.to_string()
    } else {
        format!("제{clause_no}항 {trimmed}")
    }
}

fn with_subclause_heading(text: &str, subclause_no: u32) -> String {
    let trimmed = text.trim();
    let marked = trimmed.starts_with(&format!("제{subclause_no}호"))
        || trimmed.chars().next().is_some_and(|c| c.is_ascii_digit());
    if marked {
        trimmed.to_string()
    } else {
        format!("제{subclause_no}호 {trimmed}")
    }
}
