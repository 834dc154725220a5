//! Deferred enrichment: best-effort summaries attached after the fact.
//!
//! Enrichment runs as a fire-and-forget task after the response has been
//! returned. It communicates with the main path only through the cache's
//! enrichment namespace, so it can never race the synchronous pipeline's
//! writes to the core record fields.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::cache::{CacheKey, ResultCache};
use crate::error::SourceResult;
use crate::traits::summarizer::Summarizer;

/// Deterministic extractive summarizer: leading sentences up to a length cap.
///
/// Stands in for a model-backed implementation; anything implementing
/// [`Summarizer`] plugs into the same seam.
pub struct LeadSummarizer {
    max_chars: usize,
}

impl Default for LeadSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl LeadSummarizer {
    pub fn new() -> Self {
        Self { max_chars: 120 }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars.max(1);
        self
    }
}

#[async_trait]
impl Summarizer for LeadSummarizer {
    async fn summarize(&self, text: &str) -> SourceResult<String> {
        let collapsed = collapse_whitespace(text);
        let mut summary = String::new();
        for sentence in split_sentences(&collapsed) {
            if !summary.is_empty()
                && summary.chars().count() + sentence.chars().count() > self.max_chars
            {
                break;
            }
            if !summary.is_empty() {
                summary.push(' ');
            }
            summary.push_str(sentence);
        }
        if summary.chars().count() > self.max_chars {
            summary = summary.chars().take(self.max_chars).collect::<String>() + "…";
        }
        Ok(summary)
    }
}

/// Schedule enrichment for an already-cached, found result.
///
/// Marks the entry pending immediately, then spawns the summarization
/// task; reads before completion see the pending sentinel. Failures only
/// roll the status back, they never affect the cached record.
pub fn schedule_enrichment<A: Summarizer + 'static>(
    cache: Arc<ResultCache>,
    summarizer: Arc<A>,
    key: CacheKey,
    raw_text: String,
) {
    cache.mark_enrichment_pending(&key);
    tokio::spawn(async move {
        match summarizer.summarize(&raw_text).await {
            Ok(summary) => cache.complete_enrichment(&key, summary),
            Err(e) => {
                warn!(error = %e, citation = %key.citation, "enrichment failed");
                cache.reset_enrichment(&key);
            }
        }
    });
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split on sentence-final periods, keeping the period with the sentence.
fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::EnrichmentStatus;
    use crate::types::response::{ResponseRecord, Source};

    fn record() -> ResponseRecord {
        ResponseRecord {
            found: true,
            canonical_citation: "제14조".to_string(),
            content: Some("내용".to_string()),
            structure: None,
            available_citations: vec![],
            reference_url: "https://www.law.go.kr".to_string(),
            source: Source::Registry,
            message: String::new(),
        }
    }

    #[tokio::test]
    async fn test_lead_summarizer_takes_leading_sentences() {
        let summarizer = LeadSummarizer::new().with_max_chars(30);
        let text = "학교의 장은 전문상담교사를 둔다. 배치 기준은 대통령령으로 정한다. 셋째 문장은 잘린다.";
        let summary = summarizer.summarize(text).await.unwrap();
        assert_eq!(summary, "학교의 장은 전문상담교사를 둔다.");
    }

    #[tokio::test]
    async fn test_lead_summarizer_truncates_unbroken_text() {
        let summarizer = LeadSummarizer::new().with_max_chars(10);
        let summary = summarizer.summarize("가나다라마바사아자차카타파하").await.unwrap();
        assert_eq!(summary.chars().count(), 11); // 10 chars + ellipsis
        assert!(summary.ends_with('…'));
    }

    #[tokio::test]
    async fn test_schedule_marks_pending_then_ready() {
        let cache = Arc::new(ResultCache::new());
        let key = CacheKey::new("법", "제14조");
        cache.put(key.clone(), record());

        schedule_enrichment(
            cache.clone(),
            Arc::new(LeadSummarizer::new()),
            key.clone(),
            "학교의 장은 전문상담교사를 둔다.".to_string(),
        );

        // Pending is visible immediately; completion follows asynchronously.
        let mut status = cache.enrichment(&key);
        assert_ne!(status, EnrichmentStatus::NotRequested);
        for _ in 0..100 {
            if matches!(status, EnrichmentStatus::Ready(_)) {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            status = cache.enrichment(&key);
        }
        assert_eq!(
            status,
            EnrichmentStatus::Ready("학교의 장은 전문상담교사를 둔다.".to_string())
        );
    }
}
