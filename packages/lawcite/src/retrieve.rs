//! Tiered retrieval across the registry, the rendered site, and the
//! local snapshot.
//!
//! Tiers run strictly in order and short-circuit on the first usable
//! text. The registry tier matches article numbers exactly — a wrong
//! exact match is worse than falling through — while the scrape tier is
//! allowed heuristics of descending specificity. A tier that times out or
//! errors is logged and treated as having produced nothing.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use scraper::{Html, Selector};
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

use crate::error::{SourceError, SourceResult};
use crate::link::LinkBuilder;
use crate::traits::fetcher::DocumentFetcher;
use crate::traits::registry::RegistryClient;
use crate::traits::snapshot::SnapshotStore;
use crate::types::citation::Citation;
use crate::types::law::LawRecord;
use crate::types::response::Source;

/// Orchestrator tuning.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Bound on each tier's upstream wait.
    pub tier_timeout: Duration,

    /// Minimum accepted length (in chars) for a scraped block, rejecting
    /// near-empty matches like a bare heading.
    pub min_scrape_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            tier_timeout: Duration::from_secs(8),
            min_scrape_chars: 40,
        }
    }
}

/// What retrieval produced.
#[derive(Debug, Clone)]
pub struct Retrieved {
    /// Raw statute text, `None` when every tier came up empty.
    pub raw_text: Option<String>,

    /// Every article citation seen in the registry document, kept even on
    /// misses for next-step guidance.
    pub available_citations: Vec<String>,

    /// The tier that produced the text; on a miss, the last tier tried.
    pub source: Source,
}

/// Try the three sources in priority order.
pub async fn retrieve<R, F, S>(
    config: &RetrievalConfig,
    registry: &R,
    fetcher: &F,
    snapshots: &S,
    links: &LinkBuilder,
    law: &LawRecord,
    citation: &Citation,
) -> Retrieved
where
    R: RegistryClient,
    F: DocumentFetcher,
    S: SnapshotStore,
{
    let mut available_citations = Vec::new();

    match registry_tier(config, registry, law, citation).await {
        Ok((hit, available)) => {
            available_citations = available;
            match hit {
                Some(text) if !text.trim().is_empty() => {
                    debug!(citation = ?citation.canonical(), "registry tier hit");
                    return Retrieved {
                        raw_text: Some(text),
                        available_citations,
                        source: Source::Registry,
                    };
                }
                _ => {}
            }
        }
        Err(e) => warn!(error = %e, law = %law.canonical_name, "registry tier failed"),
    }

    match scrape_tier(config, fetcher, links, law, citation).await {
        Ok(Some(text)) => {
            debug!(citation = ?citation.canonical(), "scrape tier hit");
            return Retrieved {
                raw_text: Some(text),
                available_citations,
                source: Source::Scrape,
            };
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, law = %law.canonical_name, "scrape tier failed"),
    }

    match snapshot_tier(config, snapshots, law, citation).await {
        Ok(Some(text)) if !text.trim().is_empty() => {
            debug!(citation = ?citation.canonical(), "snapshot tier hit");
            return Retrieved {
                raw_text: Some(text),
                available_citations,
                source: Source::Snapshot,
            };
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, law = %law.canonical_name, "snapshot tier failed"),
    }

    Retrieved {
        raw_text: None,
        available_citations,
        source: Source::Snapshot,
    }
}

/// Tier 1: structured registry document, exact article-number match only.
async fn registry_tier<R: RegistryClient>(
    config: &RetrievalConfig,
    registry: &R,
    law: &LawRecord,
    citation: &Citation,
) -> SourceResult<(Option<String>, Vec<String>)> {
    let Some(id) = law.registry_id.as_deref() else {
        return Ok((None, Vec::new()));
    };
    let Some(wanted_article) = citation.article_no else {
        return Ok((None, Vec::new()));
    };

    let law_doc = timeout(config.tier_timeout, registry.fetch_structured(id))
        .await
        .map_err(|_| SourceError::Timeout {
            what: format!("registry document {id}"),
        })??;

    let mut available = Vec::with_capacity(law_doc.articles.len());
    let mut hit = None;
    for article in &law_doc.articles {
        available.push(article.article_key());
        if article.article_no == wanted_article && article.branch_no == citation.branch_no {
            hit = Some(article.body.clone());
        }
    }
    Ok((hit, available))
}

/// Tier 2: scrape the rendered registry page.
async fn scrape_tier<F: DocumentFetcher>(
    config: &RetrievalConfig,
    fetcher: &F,
    links: &LinkBuilder,
    law: &LawRecord,
    citation: &Citation,
) -> SourceResult<Option<String>> {
    let Some(heading) = citation.article_key() else {
        return Ok(None);
    };
    let url = links.citation_url(&law.canonical_name, citation);

    let outer = timeout(config.tier_timeout, fetcher.fetch(&url))
        .await
        .map_err(|_| SourceError::Timeout {
            what: url.to_string(),
        })??;

    // The registry renders article text inside a nested frame; resolve the
    // frame target and fetch again when one is present.
    let page = match frame_target(&outer, &url) {
        Some(frame_url) => {
            debug!(frame = %frame_url, "following embedded frame");
            timeout(config.tier_timeout, fetcher.fetch(&frame_url))
                .await
                .map_err(|_| SourceError::Timeout {
                    what: frame_url.to_string(),
                })??
        }
        None => outer,
    };

    Ok(extract_article_block(
        &page,
        &heading,
        config.min_scrape_chars,
    ))
}

/// Tier 3: local snapshot.
async fn snapshot_tier<S: SnapshotStore>(
    config: &RetrievalConfig,
    snapshots: &S,
    law: &LawRecord,
    citation: &Citation,
) -> SourceResult<Option<String>> {
    timeout(
        config.tier_timeout,
        snapshots.lookup(&law.canonical_name, citation),
    )
    .await
    .map_err(|_| SourceError::Timeout {
        what: format!("snapshot for {}", law.canonical_name),
    })?
}

/// Boundary for the whole-page text scan: the next titled article heading.
static NEXT_ARTICLE_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"제\d+조(?:의\d+)?\(").expect("article heading pattern is valid")
});

/// Locate the embedded frame reference in the outer page, if any.
fn frame_target(html: &str, base: &Url) -> Option<Url> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("iframe[src], frame[src]").ok()?;
    let src = document.select(&selector).next()?.value().attr("src")?;
    base.join(src).ok()
}

/// Find the block of rendered text for an article heading.
///
/// Heuristics in descending specificity: a heading element containing the
/// citation key, then the smallest block element containing it, then a
/// whole-page text scan sliced at the next article heading. A match only
/// counts when it clears the minimum length.
fn extract_article_block(html: &str, heading: &str, min_chars: usize) -> Option<String> {
    let document = Html::parse_document(html);

    // Pass 1: heading tags; take the enclosing block's text.
    if let Ok(selector) = Selector::parse("h1, h2, h3, h4, h5, h6") {
        for element in document.select(&selector) {
            if !element_text(&element).contains(heading) {
                continue;
            }
            if let Some(parent) = element
                .parent()
                .and_then(scraper::ElementRef::wrap)
                .map(|p| element_text(&p))
            {
                if parent.chars().count() > min_chars {
                    return Some(parent);
                }
            }
        }
    }

    // Pass 2: smallest block element that contains the heading.
    if let Ok(selector) = Selector::parse("p, div, td, li, section, article") {
        let mut best: Option<String> = None;
        for element in document.select(&selector) {
            let text = element_text(&element);
            if !text.contains(heading) || text.chars().count() <= min_chars {
                continue;
            }
            let better = match &best {
                Some(current) => text.chars().count() < current.chars().count(),
                None => true,
            };
            if better {
                best = Some(text);
            }
        }
        if best.is_some() {
            return best;
        }
    }

    // Pass 3: whole-page text scan from the heading to the next article
    // heading.
    let full_text = document
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join("\n");
    let start = full_text.find(heading)?;
    let tail = &full_text[start..];
    let next_heading = NEXT_ARTICLE_HEADING
        .find_iter(tail)
        .map(|m| m.start())
        .find(|&offset| offset > heading.len());
    let block = match next_heading {
        Some(offset) => &tail[..offset],
        None => tail,
    };
    let block = block.trim();
    if block.chars().count() > min_chars {
        Some(block.to_string())
    } else {
        None
    }
}

fn element_text(element: &scraper::ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
