//! Integration tests for the full lookup pipeline.
//!
//! These exercise the service end to end over mock collaborators:
//! 1. Normalize the citation
//! 2. Resolve the law name
//! 3. Retrieve through the tiers
//! 4. Decompose and assemble
//! 5. Cache and enrich

use std::time::Duration;

use lawcite::cache::EnrichmentStatus;
use lawcite::service::{CitationService, LookupRequest, ServiceConfig};
use lawcite::testing::{MockFetcher, MockRegistry, MockSnapshot, MockSummarizer};
use lawcite::traits::registry::{LawCandidate, RegistryArticle, StructuredLaw};
use lawcite::types::response::Source;
use lawcite::CacheKey;

const CANONICAL: &str = "학교폭력예방 및 대책에 관한 법률";

fn candidate() -> LawCandidate {
    LawCandidate {
        name: CANONICAL.to_string(),
        abbreviation: Some("학교폭력예방법".to_string()),
        id: "009566".to_string(),
        is_current: true,
    }
}

fn structured_law() -> StructuredLaw {
    StructuredLaw {
        name: CANONICAL.to_string(),
        articles: vec![
            RegistryArticle {
                article_no: 14,
                branch_no: None,
                heading: Some("전문상담교사 배치 및 전담기구 구성".to_string()),
                body: "제14조(전문상담교사 배치 및 전담기구 구성) ① 학교의 장은 전문상담교사를 둔다.\n② 전문상담교사는 심의위원회의 요구가 있는 때에는 보고하여야 한다.".to_string(),
            },
            RegistryArticle {
                article_no: 14,
                branch_no: Some(2),
                heading: Some("학교전담경찰관".to_string()),
                body: "제14조의2(학교전담경찰관) 국가는 학교폭력 예방 업무를 담당하는 경찰관을 둘 수 있다.".to_string(),
            },
            RegistryArticle {
                article_no: 17,
                branch_no: None,
                heading: Some("가해학생에 대한 조치".to_string()),
                body: "제17조(가해학생에 대한 조치) ① 심의위원회는 다음 각 호의 조치를 요청하여야 한다.\n1. 서면사과\n2. 접촉의 금지\n② 조치의 기간은 심의위원회가 정한다.".to_string(),
            },
        ],
    }
}

fn registry() -> MockRegistry {
    MockRegistry::new()
        .with_candidates(CANONICAL, vec![candidate()])
        .with_law("009566", structured_law())
}

fn service(
    registry: MockRegistry,
    fetcher: MockFetcher,
    snapshots: MockSnapshot,
    summarizer: MockSummarizer,
) -> CitationService<MockRegistry, MockFetcher, MockSnapshot, MockSummarizer> {
    CitationService::new(registry, fetcher, snapshots, summarizer)
}

#[tokio::test]
async fn test_branch_article_lookup_end_to_end() {
    let registry = registry();
    let svc = service(
        registry.clone(),
        MockFetcher::new(),
        MockSnapshot::new(),
        MockSummarizer::new("요약"),
    );

    // Abbreviated law name, dash-form branch citation.
    let request = LookupRequest::new("학교폭력예방법", "14-2");
    let outcome = svc.lookup(&request).await;

    assert!(outcome.record.found);
    assert!(!outcome.cache_hit);
    assert_eq!(outcome.record.canonical_citation, "제14조의2");
    assert_eq!(outcome.record.source, Source::Registry);
    assert!(outcome.record.content.as_deref().unwrap().contains("경찰관"));

    let structure = outcome.record.structure.unwrap();
    assert_eq!(structure.title, "제14조의2");
    assert!(structure.children.is_empty(), "no clause markers, leaf article");

    assert!(outcome
        .record
        .reference_url
        .starts_with("https://www.law.go.kr/"));
    // Alias resolved before the registry was searched.
    assert_eq!(registry.search_queries(), vec![CANONICAL.to_string()]);
}

#[tokio::test]
async fn test_equivalent_branch_spellings_agree() {
    let svc = service(
        registry(),
        MockFetcher::new(),
        MockSnapshot::new(),
        MockSummarizer::new("요약"),
    );

    let mut canonicals = Vec::new();
    for spelling in ["14-2", "제14조의2", "14의2"] {
        let outcome = svc
            .lookup(&LookupRequest::new(CANONICAL, spelling))
            .await;
        assert!(outcome.record.found, "{spelling}");
        canonicals.push(outcome.record.canonical_citation);
    }
    assert!(canonicals.iter().all(|c| c == "제14조의2"), "{canonicals:?}");
}

#[tokio::test]
async fn test_subclause_selection_through_the_pipeline() {
    let svc = service(
        registry(),
        MockFetcher::new(),
        MockSnapshot::new(),
        MockSummarizer::new("요약"),
    );

    let request = LookupRequest::new("학교폭력예방법", "제17조")
        .with_clause("①")
        .with_subclause("2");
    let outcome = svc.lookup(&request).await;

    assert!(outcome.record.found);
    assert_eq!(outcome.record.canonical_citation, "제17조 제1항 제2호");
    assert_eq!(outcome.record.content.as_deref(), Some("접촉의 금지"));
}

#[tokio::test]
async fn test_unknown_article_keeps_guidance() {
    let registry = registry();
    let svc = service(
        registry,
        MockFetcher::new(),
        MockSnapshot::new(),
        MockSummarizer::new("요약"),
    );

    let outcome = svc
        .lookup(&LookupRequest::new("학교폭력예방법", "제999조"))
        .await;

    assert!(!outcome.record.found);
    assert!(outcome.record.content.is_none());
    assert!(outcome.record.structure.is_none());
    assert!(
        outcome.record.available_citations.contains(&"제17조".to_string()),
        "{:?}",
        outcome.record.available_citations
    );
    assert!(outcome.record.reference_url.starts_with("https://www.law.go.kr/"));
    assert!(outcome.record.message.contains("not found"));
    assert!(outcome.record.message.contains("제999조"));
}

#[tokio::test]
async fn test_malformed_citation_touches_no_collaborator() {
    let registry = registry();
    let fetcher = MockFetcher::new();
    let snapshots = MockSnapshot::new();
    let svc = service(
        registry.clone(),
        fetcher.clone(),
        snapshots.clone(),
        MockSummarizer::new("요약"),
    );

    let outcome = svc.lookup(&LookupRequest::new(CANONICAL, "abc")).await;

    assert!(!outcome.record.found);
    assert!(outcome.record.message.contains("abc"));
    assert_eq!(registry.total_calls(), 0);
    assert_eq!(fetcher.fetch_count(), 0);
    assert_eq!(snapshots.lookup_count(), 0);
}

#[tokio::test]
async fn test_unresolvable_law_name() {
    let svc = service(
        MockRegistry::new(),
        MockFetcher::new(),
        MockSnapshot::new(),
        MockSummarizer::new("요약"),
    );

    let outcome = svc
        .lookup(&LookupRequest::new("존재하지 않는 법률", "제1조"))
        .await;
    assert!(!outcome.record.found);
    assert!(outcome.record.message.contains("존재하지 않는 법률"));
}

#[tokio::test]
async fn test_repeat_lookup_is_served_from_cache() {
    let registry = registry();
    let fetcher = MockFetcher::new();
    let snapshots = MockSnapshot::new();
    let svc = service(
        registry.clone(),
        fetcher.clone(),
        snapshots.clone(),
        MockSummarizer::new("요약"),
    );

    let request = LookupRequest::new("학교폭력예방법", "제14조의2");
    let first = svc.lookup(&request).await;
    assert!(!first.cache_hit);
    let calls_after_first = registry.total_calls();

    let second = svc.lookup(&request).await;
    assert!(second.cache_hit);
    assert_eq!(second.record.canonical_citation, first.record.canonical_citation);
    // No collaborator ran for the repeat.
    assert_eq!(registry.total_calls(), calls_after_first);
    assert_eq!(fetcher.fetch_count(), 0);
    assert_eq!(snapshots.lookup_count(), 0);
}

#[tokio::test]
async fn test_registry_down_still_answers_from_snapshot() {
    let registry = MockRegistry::new().failing_search().failing_fetch();
    let snapshots = MockSnapshot::new().with_text(
        CANONICAL,
        "제15조",
        "제15조(학교폭력 예방교육 등) 학교의 장은 학기별로 1회 이상 예방교육을 실시하여야 한다.",
    );
    let svc = service(
        registry,
        MockFetcher::new(),
        snapshots,
        MockSummarizer::new("요약"),
    );

    let outcome = svc
        .lookup(&LookupRequest::new("학교폭력예방법", "제15조"))
        .await;

    assert!(outcome.record.found);
    assert_eq!(outcome.record.source, Source::Snapshot);
    assert!(outcome.record.content.as_deref().unwrap().contains("예방교육"));
}

#[tokio::test]
async fn test_snapshot_subclause_lookup_selects_the_subclause() {
    // Snapshot text scoped to the subclause, with the registry down: the
    // record must point at the requested 호, not degrade to the article.
    let registry = MockRegistry::new().failing_search().failing_fetch();
    let snapshots = MockSnapshot::new().with_text(
        CANONICAL,
        "제17조 제1항 제2호",
        "제2호 피해학생에 대한 접촉, 협박 및 보복행위의 금지",
    );
    let svc = service(
        registry,
        MockFetcher::new(),
        snapshots,
        MockSummarizer::new("요약"),
    );

    let request = LookupRequest::new("학교폭력예방법", "제17조")
        .with_clause("1")
        .with_subclause("2");
    let outcome = svc.lookup(&request).await;

    assert!(outcome.record.found);
    assert_eq!(outcome.record.source, Source::Snapshot);
    assert_eq!(outcome.record.structure.unwrap().title, "제2호");
    assert!(outcome
        .record
        .content
        .as_deref()
        .unwrap()
        .contains("접촉, 협박 및 보복행위의 금지"));
    assert!(
        !outcome.record.message.contains("not found"),
        "{}",
        outcome.record.message
    );
}

#[tokio::test]
async fn test_enrichment_goes_pending_then_ready() {
    let (summarizer, gate) = MockSummarizer::new("조문 요약").gated();
    let svc = service(registry(), MockFetcher::new(), MockSnapshot::new(), summarizer);

    let outcome = svc
        .lookup(&LookupRequest::new("학교폭력예방법", "제14조의2"))
        .await;
    assert!(outcome.record.found);
    assert_eq!(outcome.enrichment, EnrichmentStatus::Pending);

    gate.notify_one();

    let key = CacheKey::new("학교폭력예방법", "제14조의2");
    let mut status = svc.cache().enrichment(&key);
    for _ in 0..100 {
        if matches!(status, EnrichmentStatus::Ready(_)) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
        status = svc.cache().enrichment(&key);
    }
    assert_eq!(status, EnrichmentStatus::Ready("조문 요약".to_string()));

    // A repeat lookup now carries the summary.
    let repeat = svc
        .lookup(&LookupRequest::new("학교폭력예방법", "제14조의2"))
        .await;
    assert!(repeat.cache_hit);
    assert_eq!(repeat.enrichment, EnrichmentStatus::Ready("조문 요약".to_string()));
}

#[tokio::test]
async fn test_recent_log_is_bounded_and_newest_first() {
    let config = ServiceConfig {
        recent_capacity: 3,
        enrich: false,
        ..ServiceConfig::default()
    };
    let svc = CitationService::with_config(
        registry(),
        MockFetcher::new(),
        MockSnapshot::new(),
        MockSummarizer::new("요약"),
        config,
    );

    for article in ["제14조", "제14조의2", "제17조", "제999조"] {
        svc.lookup(&LookupRequest::new(CANONICAL, article)).await;
    }

    let recent = svc.recent();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].citation, "제999조");
    assert!(!recent[0].found);
    assert_eq!(recent[2].citation, "제14조의2");
}

#[tokio::test]
async fn test_response_record_serialization_shape() {
    let svc = service(
        registry(),
        MockFetcher::new(),
        MockSnapshot::new(),
        MockSummarizer::new("요약"),
    );

    let outcome = svc
        .lookup(&LookupRequest::new("학교폭력예방법", "제14조의2"))
        .await;
    let json = serde_json::to_value(&outcome.record).unwrap();

    assert_eq!(json["found"], true);
    assert_eq!(json["canonicalCitation"], "제14조의2");
    assert_eq!(json["source"], "registry");
    assert!(json["referenceUrl"].as_str().unwrap().contains("law.go.kr"));
    assert!(json["availableCitations"].is_array());
    assert!(json["structure"]["title"].is_string());
}
