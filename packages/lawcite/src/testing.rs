//! Mock collaborators for testing the pipeline without network access.
//!
//! All mocks return deterministic, configurable responses and track their
//! calls so tests can assert which tiers ran.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::Notify;
use url::Url;

use crate::error::{SourceError, SourceResult};
use crate::traits::fetcher::DocumentFetcher;
use crate::traits::registry::{LawCandidate, RegistryClient, StructuredLaw};
use crate::traits::snapshot::SnapshotStore;
use crate::traits::summarizer::Summarizer;
use crate::types::citation::Citation;

/// Mock registry with canned search results and structured laws.
///
/// Clones share call counters, so tests can keep a handle after moving a
/// mock into a service.
#[derive(Clone, Default)]
pub struct MockRegistry {
    candidates: HashMap<String, Vec<LawCandidate>>,
    laws: HashMap<String, StructuredLaw>,
    fail_search: bool,
    fail_fetch: bool,
    search_queries: Arc<RwLock<Vec<String>>>,
    fetch_ids: Arc<RwLock<Vec<String>>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canned candidates for an exact search query.
    pub fn with_candidates(mut self, query: impl Into<String>, candidates: Vec<LawCandidate>) -> Self {
        self.candidates.insert(query.into(), candidates);
        self
    }

    /// Canned structured document for a registry id.
    pub fn with_law(mut self, id: impl Into<String>, law: StructuredLaw) -> Self {
        self.laws.insert(id.into(), law);
        self
    }

    /// Make every search fail as an upstream error.
    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    /// Make every structured fetch fail as an upstream error.
    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn search_queries(&self) -> Vec<String> {
        self.search_queries.read().unwrap().clone()
    }

    pub fn search_count(&self) -> usize {
        self.search_queries.read().unwrap().len()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_ids.read().unwrap().len()
    }

    /// Every remote interaction this mock has seen.
    pub fn total_calls(&self) -> usize {
        self.search_count() + self.fetch_count()
    }
}

#[async_trait]
impl RegistryClient for MockRegistry {
    async fn search(&self, name: &str) -> SourceResult<Vec<LawCandidate>> {
        self.search_queries.write().unwrap().push(name.to_string());
        if self.fail_search {
            return Err(SourceError::Malformed("mock search failure".to_string()));
        }
        Ok(self.candidates.get(name).cloned().unwrap_or_default())
    }

    async fn fetch_structured(&self, id: &str) -> SourceResult<StructuredLaw> {
        self.fetch_ids.write().unwrap().push(id.to_string());
        if self.fail_fetch {
            return Err(SourceError::Malformed("mock fetch failure".to_string()));
        }
        self.laws
            .get(id)
            .cloned()
            .ok_or(SourceError::RegistryNotFound)
    }
}

/// Mock fetcher serving canned pages by exact URL.
#[derive(Clone, Default)]
pub struct MockFetcher {
    pages: HashMap<String, String>,
    fetches: Arc<AtomicUsize>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentFetcher for MockFetcher {
    async fn fetch(&self, url: &Url) -> SourceResult<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.pages.get(url.as_str()).cloned().ok_or_else(|| {
            SourceError::Http(format!("no canned page for {url}").into())
        })
    }
}

/// Mock snapshot store keyed by law name and citation key.
#[derive(Clone, Default)]
pub struct MockSnapshot {
    texts: HashMap<(String, String), String>,
    lookups: Arc<AtomicUsize>,
}

impl MockSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store text under a citation key: the full canonical string or the
    /// article key alone.
    pub fn with_text(
        mut self,
        law_name: impl Into<String>,
        citation_key: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.texts
            .insert((law_name.into(), citation_key.into()), text.into());
        self
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotStore for MockSnapshot {
    async fn lookup(&self, canonical_name: &str, citation: &Citation) -> SourceResult<Option<String>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        // Deepest key first, like the real store.
        for key in [citation.canonical(), citation.article_key()]
            .into_iter()
            .flatten()
        {
            if let Some(text) = self.texts.get(&(canonical_name.to_string(), key)) {
                return Ok(Some(text.clone()));
            }
        }
        Ok(None)
    }
}

/// Mock summarizer with an optional gate so tests can observe the
/// pending state deterministically.
#[derive(Clone, Default)]
pub struct MockSummarizer {
    summary: String,
    gate: Option<Arc<Notify>>,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl MockSummarizer {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ..Self::default()
        }
    }

    /// Hold every summarize call until the returned gate is notified.
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, _text: &str) -> SourceResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail {
            return Err(SourceError::Malformed("mock summarizer failure".to_string()));
        }
        Ok(self.summary.clone())
    }
}
