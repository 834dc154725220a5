//! Statute Citation Resolution Library
//!
//! Resolves Korean statute citations ("학교폭력예방법 제17조 제1항 제2호")
//! to authoritative article text: normalize the citation, resolve the law
//! name against the national registry, retrieve text through tiered
//! sources, decompose it into the statute hierarchy, and assemble a
//! response record with a portal deep link.
//!
//! # Design
//!
//! - Collaborators behind traits, injected per service instance
//! - Tiered retrieval: registry API, then portal scrape, then local snapshot
//! - Failures degrade tier by tier; a lookup never errors outward
//! - TTL result cache with deferred summary enrichment
//!
//! # Usage
//!
//! ```rust,ignore
//! use lawcite::clients::{DrfRegistryClient, HttpDocumentFetcher, JsonSnapshotStore};
//! use lawcite::enrich::LeadSummarizer;
//! use lawcite::service::{CitationService, LookupRequest};
//!
//! let service = CitationService::new(
//!     DrfRegistryClient::new("my-oc-key"),
//!     HttpDocumentFetcher::new(),
//!     JsonSnapshotStore::new("snapshots"),
//!     LeadSummarizer::default(),
//! );
//!
//! let outcome = service
//!     .lookup(&LookupRequest::new("학교폭력예방법", "제17조").with_clause("1"))
//!     .await;
//! println!("{}", outcome.record.message);
//! ```
//!
//! # Modules
//!
//! - [`normalize`] - Citation string parsing and canonical formatting
//! - [`resolve`] - Law name resolution (aliases, registry search, fuzzy match)
//! - [`retrieve`] - Tiered text retrieval
//! - [`decompose`] - Recursive decomposition into the article/clause/subclause tree
//! - [`assemble`] - Response record assembly and graceful degradation
//! - [`cache`] - TTL result cache with enrichment state
//! - [`enrich`] - Deferred summary enrichment
//! - [`clients`] - Production trait implementations
//! - [`testing`] - Mock collaborators for tests

pub mod assemble;
pub mod cache;
pub mod clients;
pub mod decompose;
pub mod enrich;
pub mod error;
pub mod link;
pub mod normalize;
pub mod resolve;
pub mod retrieve;
pub mod service;
pub mod testing;
pub mod traits;
pub mod types;

pub use error::{LookupError, SourceError};
pub use traits::{
    fetcher::DocumentFetcher,
    registry::{LawCandidate, RegistryArticle, RegistryClient, StructuredLaw},
    snapshot::SnapshotStore,
    summarizer::Summarizer,
};
pub use types::{
    citation::Citation,
    law::LawRecord,
    node::DocumentNode,
    response::{ResponseRecord, Source},
};

pub use cache::{CacheKey, EnrichmentStatus, ResultCache};
pub use normalize::CitationNormalizer;
pub use service::{CitationService, LookupOutcome, LookupRequest, RecentLookup, ServiceConfig};
