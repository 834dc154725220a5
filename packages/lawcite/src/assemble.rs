//! Response assembly: from retrieved text and its decomposition to the
//! final response record.
//!
//! Selection walks the tree by exact title match, article → clause →
//! subclause, and degrades gracefully: a missing sub-level returns the
//! nearest found ancestor's text with a note instead of a blanket
//! failure. Terminal errors also land here so that every outcome becomes
//! a well-formed record.

use crate::decompose::Decomposed;
use crate::error::LookupError;
use crate::link::LinkBuilder;
use crate::types::citation::Citation;
use crate::types::law::LawRecord;
use crate::types::node::DocumentNode;
use crate::types::response::{ResponseRecord, Source};

/// Build the record for retrieved text.
pub fn assemble_found(
    links: &LinkBuilder,
    law: &LawRecord,
    citation: &Citation,
    decomposed: Decomposed,
    available_citations: Vec<String>,
    source: Source,
) -> ResponseRecord {
    let canonical = citation.canonical().unwrap_or_default();
    let article_key = citation.article_key().unwrap_or_default();
    let reference_url = links.citation_url(&law.canonical_name, citation).to_string();

    let article = article_node(&article_key, decomposed);
    let (node, missing) = select_node(&article, citation);

    let message = match missing {
        None => format!("{} retrieved via {}", canonical, source.as_str()),
        Some(level) => format!(
            "requested sub-level {level} not found in {article_key}; returning {}",
            node.title
        ),
    };

    ResponseRecord {
        found: true,
        canonical_citation: canonical,
        content: Some(node.flatten()),
        structure: Some(node.clone()),
        available_citations,
        reference_url,
        source,
        message,
    }
}

/// Build the record for a terminal failure.
pub fn assemble_failure(links: &LinkBuilder, citation: &Citation, error: LookupError) -> ResponseRecord {
    let canonical = citation
        .canonical()
        .unwrap_or_else(|| citation.law_name.clone());

    match error {
        LookupError::InvalidCitation { raw } => ResponseRecord {
            found: false,
            canonical_citation: raw.clone(),
            content: None,
            structure: None,
            available_citations: Vec::new(),
            reference_url: links.law_url(&citation.law_name).to_string(),
            source: Source::Snapshot,
            message: format!(
                "could not parse citation \"{raw}\"; expected forms like 14, 14-2, 제14조의2 제1항"
            ),
        },
        LookupError::LawNotResolved { name, candidates } => {
            let guidance = if candidates.is_empty() {
                String::new()
            } else {
                format!(" Registry candidates: {}.", candidates.join(", "))
            };
            ResponseRecord {
                found: false,
                canonical_citation: canonical,
                content: None,
                structure: None,
                available_citations: Vec::new(),
                reference_url: links.law_url(&name).to_string(),
                source: Source::Snapshot,
                message: format!("no law matched \"{name}\".{guidance}"),
            }
        }
        LookupError::ArticleNotFound {
            law_name,
            citation: cited,
            available,
            reference_url,
        } => {
            let listing = if available.is_empty() {
                String::new()
            } else {
                format!(" Available: {}.", available.join(", "))
            };
            ResponseRecord {
                found: false,
                canonical_citation: cited.clone(),
                content: None,
                structure: None,
                available_citations: available,
                reference_url,
                source: Source::Snapshot,
                message: format!("{cited} not found in {law_name}.{listing}"),
            }
        }
    }
}

/// Pick the article node out of whatever shape decomposition produced.
///
/// Leaves become an article node directly (the source already scoped the
/// text). Containers prefer the exact article-title child; a lone child
/// stands in when titles drifted; otherwise the whole fragment is treated
/// as the article's own text.
fn article_node(article_key: &str, decomposed: Decomposed) -> DocumentNode {
    match decomposed {
        Decomposed::Leaf(body) => DocumentNode::leaf(article_key, body),
        Decomposed::Tree(container) => {
            if let Some(exact) = container.child(article_key) {
                return exact.clone();
            }
            let has_article_children = container
                .children
                .iter()
                .any(|c| c.title.contains('조'));
            if !has_article_children {
                // Clause-level fragment; hang it under the article key.
                return DocumentNode {
                    title: article_key.to_string(),
                    body: container.body,
                    children: container.children,
                };
            }
            if container.children.len() == 1 {
                return container.children.into_iter().next().expect("one child");
            }
            DocumentNode::leaf(article_key, container.flatten())
        }
    }
}

/// Walk clause → subclause by exact title; on a miss, stop at the nearest
/// found ancestor and report which level was missing.
fn select_node<'a>(
    article: &'a DocumentNode,
    citation: &Citation,
) -> (&'a DocumentNode, Option<String>) {
    let mut node = article;

    let Some(clause_key) = citation.clause_key() else {
        return (node, None);
    };
    match node.child(&clause_key) {
        Some(clause) => node = clause,
        None => {
            // Sub-level-scoped source text may carry only the deepest
            // marker; a direct subclause-titled child is the requested
            // node, not a degradation.
            if let Some(subclause_key) = citation.subclause_key() {
                if let Some(direct) = node.child(&subclause_key) {
                    return (direct, None);
                }
            }
            return (node, Some(clause_key));
        }
    }

    let Some(subclause_key) = citation.subclause_key() else {
        return (node, None);
    };
    match node.child(&subclause_key) {
        Some(subclause) => (subclause, None),
        None => (node, Some(subclause_key)),
    }
}
