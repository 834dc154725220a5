//! TTL cache for resolved responses, with a separate enrichment namespace.
//!
//! The cache is an explicitly constructed, injectable service — never a
//! process-wide singleton — so tests can drive TTL expiry with a manual
//! clock. Entries expire after a fixed TTL and are otherwise never
//! evicted; size is bounded by distinct citation traffic.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::response::ResponseRecord;

/// Cache key: law name plus normalized canonical citation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub law_name: String,
    pub citation: String,
}

impl CacheKey {
    pub fn new(law_name: impl Into<String>, citation: impl Into<String>) -> Self {
        Self {
            law_name: law_name.into(),
            citation: citation.into(),
        }
    }
}

/// State of the deferred enrichment for a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "status", content = "summary")]
pub enum EnrichmentStatus {
    /// Enrichment was never scheduled (miss or not-found result).
    NotRequested,
    /// Scheduled but not yet completed.
    Pending,
    /// Completed; carries the short abstract.
    Ready(String),
}

struct CacheEntry {
    record: ResponseRecord,
    expires_at: DateTime<Utc>,
    enrichment: EnrichmentStatus,
}

/// Clock abstraction so TTL expiry is testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Shared TTL cache of response records.
pub struct ResultCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
}

impl ResultCache {
    /// One-hour TTL by default.
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(3600))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::hours(1));
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            ttl,
        }
    }

    /// Get a live record. Expired entries are dropped on access.
    pub fn get(&self, key: &CacheKey) -> Option<ResponseRecord> {
        self.get_with_enrichment(key).map(|(record, _)| record)
    }

    /// Get a live record together with its enrichment state.
    pub fn get_with_enrichment(
        &self,
        key: &CacheKey,
    ) -> Option<(ResponseRecord, EnrichmentStatus)> {
        let now = self.clock.now();
        {
            let entries = self.entries.read().unwrap();
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => {
                    return Some((entry.record.clone(), entry.enrichment.clone()));
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Entry exists but is stale; drop it.
        let mut entries = self.entries.write().unwrap();
        if entries.get(key).map(|e| e.expires_at <= now) == Some(true) {
            entries.remove(key);
        }
        None
    }

    /// Store a record. Overlapping writes simply overwrite; retrieval is
    /// idempotent so the last writer wins harmlessly.
    pub fn put(&self, key: CacheKey, record: ResponseRecord) {
        let expires_at = self.clock.now() + self.ttl;
        self.entries.write().unwrap().insert(
            key,
            CacheEntry {
                record,
                expires_at,
                enrichment: EnrichmentStatus::NotRequested,
            },
        );
    }

    /// Mark an entry's enrichment as scheduled.
    pub fn mark_enrichment_pending(&self, key: &CacheKey) {
        if let Some(entry) = self.entries.write().unwrap().get_mut(key) {
            entry.enrichment = EnrichmentStatus::Pending;
        }
    }

    /// Attach a completed summary.
    ///
    /// Writes only the enrichment field; the record's core fields (`found`,
    /// `content`, `structure`) are never touched after creation. A summary
    /// arriving after expiry is silently dropped.
    pub fn complete_enrichment(&self, key: &CacheKey, summary: String) {
        if let Some(entry) = self.entries.write().unwrap().get_mut(key) {
            entry.enrichment = EnrichmentStatus::Ready(summary);
        }
    }

    /// Roll a failed enrichment back so it is not reported as pending
    /// forever.
    pub fn reset_enrichment(&self, key: &CacheKey) {
        if let Some(entry) = self.entries.write().unwrap().get_mut(key) {
            entry.enrichment = EnrichmentStatus::NotRequested;
        }
    }

    /// Current enrichment state for a key.
    pub fn enrichment(&self, key: &CacheKey) -> EnrichmentStatus {
        self.entries
            .read()
            .unwrap()
            .get(key)
            .map(|e| e.enrichment.clone())
            .unwrap_or(EnrichmentStatus::NotRequested)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::response::Source;
    use std::sync::Mutex;

    /// Test clock advanced by hand.
    pub struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        pub fn starting_now() -> Self {
            Self {
                now: Mutex::new(Utc::now()),
            }
        }

        pub fn advance(&self, duration: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += chrono::Duration::from_std(duration).unwrap();
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

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

    fn key() -> CacheKey {
        CacheKey::new("법", "제14조")
    }

    #[test]
    fn test_hit_within_ttl() {
        let cache = ResultCache::with_ttl(Duration::from_secs(60));
        cache.put(key(), record());
        assert!(cache.get(&key()).is_some());
    }

    #[test]
    fn test_expiry_with_manual_clock() {
        let clock = Arc::new(ManualClock::starting_now());
        let cache = ResultCache::with_clock(Duration::from_secs(3600), clock.clone());
        cache.put(key(), record());
        clock.advance(Duration::from_secs(3599));
        assert!(cache.get(&key()).is_some());
        clock.advance(Duration::from_secs(2));
        assert!(cache.get(&key()).is_none());
        // The stale entry was dropped on access.
        assert!(cache.is_empty());
    }

    #[test]
    fn test_enrichment_lifecycle() {
        let cache = ResultCache::with_ttl(Duration::from_secs(60));
        let key = key();
        assert_eq!(cache.enrichment(&key), EnrichmentStatus::NotRequested);

        cache.put(key.clone(), record());
        cache.mark_enrichment_pending(&key);
        assert_eq!(cache.enrichment(&key), EnrichmentStatus::Pending);

        cache.complete_enrichment(&key, "요약".to_string());
        assert_eq!(
            cache.enrichment(&key),
            EnrichmentStatus::Ready("요약".to_string())
        );

        // Enrichment never mutated the record's core fields.
        let (cached, _) = cache.get_with_enrichment(&key).unwrap();
        assert_eq!(cached, record());
    }

    #[test]
    fn test_enrichment_after_expiry_is_dropped() {
        let clock = Arc::new(ManualClock::starting_now());
        let cache = ResultCache::with_clock(Duration::from_secs(1), clock.clone());
        cache.put(key(), record());
        clock.advance(Duration::from_secs(5));
        assert!(cache.get(&key()).is_none());
        cache.complete_enrichment(&key(), "늦은 요약".to_string());
        assert_eq!(cache.enrichment(&key()), EnrichmentStatus::NotRequested);
    }

    #[test]
    fn test_overwrite_replaces_entry() {
        let cache = ResultCache::with_ttl(Duration::from_secs(60));
        cache.put(key(), record());
        let mut second = record();
        second.message = "updated".to_string();
        cache.put(key(), second.clone());
        assert_eq!(cache.get(&key()).unwrap().message, "updated");
    }
}
