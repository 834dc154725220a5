//! Canonical reference URL construction.
//!
//! The reference URL is produced deterministically for every outcome,
//! found or not, so the end user always has a manual fallback into the
//! registry's own rendering of the statute.

use url::Url;

use crate::types::citation::Citation;

const DEFAULT_BASE: &str = "https://www.law.go.kr";

/// Builds law.go.kr reference URLs with percent-encoded Korean segments.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    base: Url,
}

impl Default for LinkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkBuilder {
    pub fn new() -> Self {
        Self {
            base: Url::parse(DEFAULT_BASE).expect("default base URL is valid"),
        }
    }

    /// Point at a different registry host (tests, mirrors).
    pub fn with_base(base: Url) -> Self {
        Self { base }
    }

    /// URL for a citation: `/법령/<법령명>/<제N조(의M)>`, or the law page
    /// alone when the citation has no parsed article.
    pub fn citation_url(&self, canonical_name: &str, citation: &Citation) -> Url {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .expect("registry base URL is a valid base");
            segments.push("법령");
            segments.push(canonical_name);
            if let Some(article_key) = citation.article_key() {
                segments.push(&article_key);
            }
        }
        url
    }

    /// URL for the law's main page.
    pub fn law_url(&self, canonical_name: &str) -> Url {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .expect("registry base URL is a valid base");
            segments.push("법령");
            segments.push(canonical_name);
        }
        url
    }
}
