//! Plain HTTP document fetcher for the scrape tier.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::redirect::Policy;
use tracing::debug;
use url::Url;

use crate::error::{SourceError, SourceResult};
use crate::traits::fetcher::DocumentFetcher;

/// Fetcher that presents itself as a regular browser. The portal serves
/// stripped-down pages to obvious bots, so the header set matters.
pub struct HttpDocumentFetcher {
    client: reqwest::Client,
}

impl Default for HttpDocumentFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpDocumentFetcher {
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            ),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("ko-KR,ko;q=0.9,en-US;q=0.5"),
        );

        Self {
            client: reqwest::Client::builder()
                .default_headers(headers)
                .redirect(Policy::limited(5))
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch(&self, url: &Url) -> SourceResult<String> {
        debug!(url = %url, "fetching page");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| SourceError::Http(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http(
                format!("HTTP {status} fetching {url}").into(),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::Http(Box::new(e)))
    }
}
