//! HTML document fetcher interface.

use async_trait::async_trait;
use url::Url;

use crate::error::SourceResult;

/// Fetches raw markup for a URL.
///
/// The scrape tier performs two-hop resolution through this trait: it
/// fetches the outer page, locates the embedded frame reference, and
/// fetches the frame target. The fetcher itself stays a single-URL
/// primitive; the hop logic lives in the orchestrator.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch a URL and return the raw markup.
    async fn fetch(&self, url: &Url) -> SourceResult<String>;
}
