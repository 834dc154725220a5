//! Summarizer interface for deferred enrichment.

use async_trait::async_trait;

use crate::error::SourceResult;

/// Produces the short abstract attached to cached results after the
/// response has been returned.
///
/// Enrichment is strictly best-effort: a failing summarizer only means the
/// cache entry stays unenriched.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> SourceResult<String>;
}
