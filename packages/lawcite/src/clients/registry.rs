//! DRF registry client for the national law information center.
//!
//! Two endpoints are used: `lawSearch.do` for name search and
//! `lawService.do` for the full structured law. Both answer XML keyed by
//! localized element names; the parsers below normalize everything into
//! ordered sequences once, at this boundary, so the rest of the pipeline
//! never branches on single-vs-list shapes.

use std::time::Duration;

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;
use url::Url;

use crate::error::{SourceError, SourceResult};
use crate::traits::registry::{LawCandidate, RegistryArticle, RegistryClient, StructuredLaw};

const DEFAULT_BASE: &str = "https://www.law.go.kr/DRF/";

/// Marker strings the registry embeds in "no result" responses. A body
/// carrying one of these is never parsed as a document.
const NOT_FOUND_MARKERS: &[&str] = &["검색결과가 없습니다", "해당하는 법령이 없습니다"];

/// Registry client over the DRF open API.
pub struct DrfRegistryClient {
    client: reqwest::Client,
    base: Url,
    /// The OC request credential issued per consumer.
    oc: String,
}

impl DrfRegistryClient {
    pub fn new(oc: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            base: Url::parse(DEFAULT_BASE).expect("default DRF base URL is valid"),
            oc: oc.into(),
        }
    }

    /// Point at a different endpoint (tests, mirrors).
    pub fn with_base(mut self, base: Url) -> Self {
        self.base = base;
        self
    }

    async fn get_text(&self, endpoint: &str, params: &[(&str, &str)]) -> SourceResult<String> {
        let url = self.base.join(endpoint)?;
        let response = self
            .client
            .get(url)
            .query(&[("OC", self.oc.as_str()), ("target", "law"), ("type", "XML")])
            .query(params)
            .send()
            .await
            .map_err(|e| SourceError::Http(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http(
                format!("HTTP {status} from registry").into(),
            ));
        }
        response
            .text()
            .await
            .map_err(|e| SourceError::Http(Box::new(e)))
    }
}

#[async_trait]
impl RegistryClient for DrfRegistryClient {
    async fn search(&self, name: &str) -> SourceResult<Vec<LawCandidate>> {
        let body = self.get_text("lawSearch.do", &[("query", name)]).await?;
        if contains_not_found_marker(&body) {
            debug!(name = %name, "registry search returned its not-found marker");
            return Ok(Vec::new());
        }
        parse_search_response(&body)
    }

    async fn fetch_structured(&self, id: &str) -> SourceResult<StructuredLaw> {
        let body = self.get_text("lawService.do", &[("ID", id)]).await?;
        if contains_not_found_marker(&body) {
            return Err(SourceError::RegistryNotFound);
        }
        parse_law_document(&body)
    }
}

fn contains_not_found_marker(body: &str) -> bool {
    NOT_FOUND_MARKERS.iter().any(|marker| body.contains(marker))
}

/// Fields of one `<law>` element in a search response.
#[derive(Clone, Copy, PartialEq)]
enum SearchField {
    Name,
    Abbreviation,
    Id,
    HistoryCode,
}

impl SearchField {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        if tag == "법령명한글".as_bytes() {
            Some(Self::Name)
        } else if tag == "법령약칭명".as_bytes() {
            Some(Self::Abbreviation)
        } else if tag == "법령ID".as_bytes() {
            Some(Self::Id)
        } else if tag == "현행연혁코드".as_bytes() {
            Some(Self::HistoryCode)
        } else {
            None
        }
    }
}

#[derive(Default)]
struct PartialCandidate {
    name: String,
    abbreviation: Option<String>,
    id: String,
    is_current: bool,
}

impl PartialCandidate {
    fn build(self) -> Option<LawCandidate> {
        if self.name.is_empty() || self.id.is_empty() {
            return None;
        }
        Some(LawCandidate {
            name: self.name,
            abbreviation: self.abbreviation.filter(|a| !a.is_empty()),
            id: self.id,
            is_current: self.is_current,
        })
    }
}

/// Parse a `lawSearch.do` XML body into candidates.
fn parse_search_response(xml: &str) -> SourceResult<Vec<LawCandidate>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut candidates = Vec::new();
    let mut current: Option<PartialCandidate> = None;
    let mut field: Option<SearchField> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let tag = e.name();
                if tag.as_ref() == b"law" {
                    current = Some(PartialCandidate::default());
                } else if current.is_some() {
                    field = SearchField::from_tag(tag.as_ref());
                }
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| SourceError::Malformed(e.to_string()))?
                    .into_owned();
                apply_search_field(&mut current, field, text);
            }
            Ok(Event::CData(t)) => {
                let text = String::from_utf8_lossy(t.as_ref()).into_owned();
                apply_search_field(&mut current, field, text);
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"law" {
                    if let Some(candidate) = current.take().and_then(PartialCandidate::build) {
                        candidates.push(candidate);
                    }
                }
                field = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SourceError::Xml(e)),
            _ => {}
        }
    }
    Ok(candidates)
}

fn apply_search_field(
    current: &mut Option<PartialCandidate>,
    field: Option<SearchField>,
    text: String,
) {
    let (Some(candidate), Some(field)) = (current.as_mut(), field) else {
        return;
    };
    match field {
        SearchField::Name => candidate.name = text,
        SearchField::Abbreviation => candidate.abbreviation = Some(text),
        SearchField::Id => candidate.id = text,
        SearchField::HistoryCode => candidate.is_current = text.trim() == "현행",
    }
}

/// Fields of one article block in a `lawService.do` document.
#[derive(Clone, Copy, PartialEq)]
enum DocField {
    LawName,
    ArticleNo,
    BranchNo,
    Heading,
    ArticleBody,
    ClauseBody,
    SubclauseBody,
}

impl DocField {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        if tag == "법령명_한글".as_bytes() || tag == "법령명한글".as_bytes() {
            Some(Self::LawName)
        } else if tag == "조문번호".as_bytes() {
            Some(Self::ArticleNo)
        } else if tag == "조문가지번호".as_bytes() {
            Some(Self::BranchNo)
        } else if tag == "조문제목".as_bytes() {
            Some(Self::Heading)
        } else if tag == "조문내용".as_bytes() {
            Some(Self::ArticleBody)
        } else if tag == "항내용".as_bytes() {
            Some(Self::ClauseBody)
        } else if tag == "호내용".as_bytes() {
            Some(Self::SubclauseBody)
        } else {
            None
        }
    }
}

#[derive(Default)]
struct PartialArticle {
    article_no: Option<u32>,
    branch_no: Option<u32>,
    heading: Option<String>,
    body: String,
}

impl PartialArticle {
    fn push_body(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if !self.body.is_empty() {
            self.body.push('\n');
        }
        self.body.push_str(text);
    }

    fn build(self) -> Option<RegistryArticle> {
        Some(RegistryArticle {
            article_no: self.article_no?,
            branch_no: self.branch_no,
            heading: self.heading.filter(|h| !h.is_empty()),
            body: self.body,
        })
    }
}

/// Parse a `lawService.do` XML body into a structured law.
fn parse_law_document(xml: &str) -> SourceResult<StructuredLaw> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let article_tag = "조문단위".as_bytes();
    let mut name = String::new();
    let mut articles = Vec::new();
    let mut current: Option<PartialArticle> = None;
    let mut field: Option<DocField> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let tag = e.name();
                if tag.as_ref() == article_tag {
                    current = Some(PartialArticle::default());
                } else {
                    field = DocField::from_tag(tag.as_ref());
                }
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| SourceError::Malformed(e.to_string()))?
                    .into_owned();
                apply_doc_field(&mut name, &mut current, field, &text);
            }
            Ok(Event::CData(t)) => {
                let text = String::from_utf8_lossy(t.as_ref()).into_owned();
                apply_doc_field(&mut name, &mut current, field, &text);
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == article_tag {
                    if let Some(article) = current.take().and_then(PartialArticle::build) {
                        articles.push(article);
                    }
                }
                field = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SourceError::Xml(e)),
            _ => {}
        }
    }

    if name.is_empty() && articles.is_empty() {
        return Err(SourceError::Malformed(
            "registry document had no law name and no articles".to_string(),
        ));
    }
    Ok(StructuredLaw { name, articles })
}

fn apply_doc_field(
    name: &mut String,
    current: &mut Option<PartialArticle>,
    field: Option<DocField>,
    text: &str,
) {
    match (field, current.as_mut()) {
        (Some(DocField::LawName), _) if name.is_empty() => *name = text.trim().to_string(),
        (Some(DocField::ArticleNo), Some(article)) => {
            article.article_no = text.trim().parse().ok();
        }
        (Some(DocField::BranchNo), Some(article)) => {
            article.branch_no = text.trim().parse().ok();
        }
        (Some(DocField::Heading), Some(article)) => {
            article.heading = Some(text.trim().to_string());
        }
        (
            Some(DocField::ArticleBody | DocField::ClauseBody | DocField::SubclauseBody),
            Some(article),
        ) => article.push_body(text),
        _ => {}
    }
}
