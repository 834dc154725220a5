//! The lookup service — wires the pipeline end to end.
//!
//! normalize → cache get → resolve name → retrieve → decompose →
//! assemble → cache put → schedule enrichment. Synchronous and
//! sequential per request; enrichment is the only background work.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::assemble::{assemble_failure, assemble_found};
use crate::cache::{CacheKey, EnrichmentStatus, ResultCache};
use crate::decompose::Decomposer;
use crate::enrich::schedule_enrichment;
use crate::error::LookupError;
use crate::link::LinkBuilder;
use crate::normalize::CitationNormalizer;
use crate::resolve::{NameResolver, Resolution};
use crate::retrieve::{retrieve, RetrievalConfig};
use crate::traits::fetcher::DocumentFetcher;
use crate::traits::registry::RegistryClient;
use crate::traits::snapshot::SnapshotStore;
use crate::traits::summarizer::Summarizer;
use crate::types::citation::{normalize_glyphs, Citation};
use crate::types::response::ResponseRecord;

/// One incoming lookup, fields as the user typed them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupRequest {
    pub law_name: String,
    pub article_no: String,
    pub clause_no: Option<String>,
    pub subclause_no: Option<String>,
}

impl LookupRequest {
    pub fn new(law_name: impl Into<String>, article_no: impl Into<String>) -> Self {
        Self {
            law_name: law_name.into(),
            article_no: article_no.into(),
            clause_no: None,
            subclause_no: None,
        }
    }

    pub fn with_clause(mut self, clause_no: impl Into<String>) -> Self {
        self.clause_no = Some(clause_no.into());
        self
    }

    pub fn with_subclause(mut self, subclause_no: impl Into<String>) -> Self {
        self.subclause_no = Some(subclause_no.into());
        self
    }

    /// Combine the separate request fields into one citation string for
    /// the normalizer. Clause and subclause arrive as bare digits, glyphs
    /// ("①"), or marked forms ("제1항"); all reduce to digits here.
    fn citation_text(&self) -> String {
        let mut text = self.article_no.trim().to_string();
        if let Some(digits) = Self::digits(self.clause_no.as_deref()) {
            text.push_str(&format!(" 제{digits}항"));
            if let Some(digits) = Self::digits(self.subclause_no.as_deref()) {
                text.push_str(&format!(" 제{digits}호"));
            }
        }
        text
    }

    fn digits(raw: Option<&str>) -> Option<String> {
        let digits: String = normalize_glyphs(raw?)
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        (!digits.is_empty()).then_some(digits)
    }
}

/// The outcome handed to adapters: the record plus the enrichment state
/// at read time.
#[derive(Debug, Clone)]
pub struct LookupOutcome {
    pub record: ResponseRecord,
    pub enrichment: EnrichmentStatus,
    pub cache_hit: bool,
}

/// One line of the bounded recent-activity log.
#[derive(Debug, Clone, Serialize)]
pub struct RecentLookup {
    pub law_name: String,
    pub citation: String,
    pub found: bool,
    pub cache_hit: bool,
    pub at: DateTime<Utc>,
}

/// Service tuning.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub cache_ttl: Duration,
    pub retrieval: RetrievalConfig,
    /// Whether found results get a deferred summary.
    pub enrich: bool,
    /// Capacity of the recent-activity ring.
    pub recent_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(3600),
            retrieval: RetrievalConfig::default(),
            enrich: true,
            recent_capacity: 50,
        }
    }
}

/// Citation lookup service over injectable collaborators.
pub struct CitationService<R, F, S, A> {
    registry: R,
    fetcher: F,
    snapshots: S,
    summarizer: Arc<A>,
    cache: Arc<ResultCache>,
    normalizer: CitationNormalizer,
    resolver: NameResolver,
    decomposer: Decomposer,
    links: LinkBuilder,
    config: ServiceConfig,
    recent: Mutex<VecDeque<RecentLookup>>,
}

impl<R, F, S, A> CitationService<R, F, S, A>
where
    R: RegistryClient,
    F: DocumentFetcher,
    S: SnapshotStore,
    A: Summarizer + 'static,
{
    pub fn new(registry: R, fetcher: F, snapshots: S, summarizer: A) -> Self {
        Self::with_config(registry, fetcher, snapshots, summarizer, ServiceConfig::default())
    }

    pub fn with_config(
        registry: R,
        fetcher: F,
        snapshots: S,
        summarizer: A,
        config: ServiceConfig,
    ) -> Self {
        let cache = Arc::new(ResultCache::with_ttl(config.cache_ttl));
        Self {
            registry,
            fetcher,
            snapshots,
            summarizer: Arc::new(summarizer),
            cache,
            normalizer: CitationNormalizer::new(),
            resolver: NameResolver::new(),
            decomposer: Decomposer::new(),
            links: LinkBuilder::new(),
            config,
            recent: Mutex::new(VecDeque::new()),
        }
    }

    /// Substitute the cache (for a test clock or cross-service sharing).
    pub fn with_cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Substitute the name resolver (extra aliases, tuned threshold).
    pub fn with_resolver(mut self, resolver: NameResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Resolve one citation lookup. Never errors: every outcome is a
    /// well-formed record.
    pub async fn lookup(&self, request: &LookupRequest) -> LookupOutcome {
        let citation_text = request.citation_text();
        let citation = self.normalizer.parse(&request.law_name, &citation_text);

        let key = self.cache_key(&citation, &citation_text);
        if let Some((record, enrichment)) = self.cache.get_with_enrichment(&key) {
            debug!(law = %key.law_name, citation = %key.citation, "cache hit");
            self.log_recent(&key, record.found, true);
            return LookupOutcome {
                record,
                enrichment,
                cache_hit: true,
            };
        }

        let record = self.lookup_uncached(&citation, &citation_text, &key).await;
        self.log_recent(&key, record.found, false);
        LookupOutcome {
            enrichment: self.cache.enrichment(&key),
            record,
            cache_hit: false,
        }
    }

    /// The bounded recent-activity log, newest first.
    pub fn recent(&self) -> Vec<RecentLookup> {
        self.recent.lock().unwrap().iter().cloned().collect()
    }

    async fn lookup_uncached(
        &self,
        citation: &Citation,
        citation_text: &str,
        key: &CacheKey,
    ) -> ResponseRecord {
        if !citation.is_valid() {
            let record = assemble_failure(
                &self.links,
                citation,
                LookupError::InvalidCitation {
                    raw: citation_text.to_string(),
                },
            );
            self.cache.put(key.clone(), record.clone());
            return record;
        }

        let law = match self.resolver.resolve(&self.registry, &citation.law_name).await {
            Resolution::Resolved(law) => law,
            Resolution::Unresolved { candidates } => {
                let record = assemble_failure(
                    &self.links,
                    citation,
                    LookupError::LawNotResolved {
                        name: citation.law_name.clone(),
                        candidates,
                    },
                );
                self.cache.put(key.clone(), record.clone());
                return record;
            }
        };

        let retrieved = retrieve(
            &self.config.retrieval,
            &self.registry,
            &self.fetcher,
            &self.snapshots,
            &self.links,
            &law,
            citation,
        )
        .await;

        let record = match retrieved.raw_text {
            Some(raw_text) => {
                let decomposed = self.decomposer.decompose(&raw_text);
                let record = assemble_found(
                    &self.links,
                    &law,
                    citation,
                    decomposed,
                    retrieved.available_citations,
                    retrieved.source,
                );
                self.cache.put(key.clone(), record.clone());
                if self.config.enrich {
                    schedule_enrichment(
                        self.cache.clone(),
                        self.summarizer.clone(),
                        key.clone(),
                        raw_text,
                    );
                }
                record
            }
            None => {
                let reference_url = self
                    .links
                    .citation_url(&law.canonical_name, citation)
                    .to_string();
                let record = assemble_failure(
                    &self.links,
                    citation,
                    LookupError::ArticleNotFound {
                        law_name: law.canonical_name.clone(),
                        citation: citation.canonical().unwrap_or_default(),
                        available: retrieved.available_citations,
                        reference_url,
                    },
                );
                self.cache.put(key.clone(), record.clone());
                record
            }
        };

        info!(
            law = %law.canonical_name,
            citation = %key.citation,
            found = record.found,
            source = record.source.as_str(),
            "lookup resolved"
        );
        record
    }

    /// Cache key: squashed law name plus canonical citation (or the raw
    /// text when unparsable, so repeated bad input also short-circuits).
    fn cache_key(&self, citation: &Citation, citation_text: &str) -> CacheKey {
        let law_name: String = citation
            .law_name
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let cite = citation
            .canonical()
            .unwrap_or_else(|| citation_text.to_string());
        CacheKey::new(law_name, cite)
    }

    fn log_recent(&self, key: &CacheKey, found: bool, cache_hit: bool) {
        let mut recent = self.recent.lock().unwrap();
        if recent.len() >= self.config.recent_capacity {
            recent.pop_back();
        }
        recent.push_front(RecentLookup {
            law_name: key.law_name.clone(),
            citation: key.citation.clone(),
            found,
            cache_hit,
            at: Utc::now(),
        });
    }
}
