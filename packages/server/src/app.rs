//! HTTP surface over the citation service.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use lawcite::cache::EnrichmentStatus;
use lawcite::clients::{DrfRegistryClient, HttpDocumentFetcher, JsonSnapshotStore};
use lawcite::enrich::LeadSummarizer;
use lawcite::service::{CitationService, LookupRequest, RecentLookup, ServiceConfig};
use lawcite::types::response::ResponseRecord;

use crate::config::Config;

type Service =
    CitationService<DrfRegistryClient, HttpDocumentFetcher, JsonSnapshotStore, LeadSummarizer>;

#[derive(Clone)]
pub struct AppState {
    service: Arc<Service>,
}

/// Build the application router.
pub fn build_app(config: &Config) -> Router {
    let service = CitationService::with_config(
        DrfRegistryClient::new(config.law_api_oc.clone()),
        HttpDocumentFetcher::new(),
        JsonSnapshotStore::new(config.snapshot_dir.clone()),
        LeadSummarizer::new(),
        ServiceConfig {
            cache_ttl: Duration::from_secs(config.cache_ttl_secs),
            ..ServiceConfig::default()
        },
    );
    let state = AppState {
        service: Arc::new(service),
    };

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/law", get(law_handler))
        .route("/recent", get(recent_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root_handler() -> &'static str {
    "statute citation API is running"
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

#[derive(Deserialize)]
struct LawParams {
    law_name: String,
    article_no: String,
    clause_no: Option<String>,
    subclause_no: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LawResponse {
    #[serde(flatten)]
    record: ResponseRecord,
    enrichment: EnrichmentStatus,
    cache_hit: bool,
}

/// Citation lookup endpoint. Always 200 with a well-formed record; the
/// `found` field carries the outcome.
async fn law_handler(
    State(state): State<AppState>,
    Query(params): Query<LawParams>,
) -> (StatusCode, Json<LawResponse>) {
    let mut request = LookupRequest::new(params.law_name, params.article_no);
    if let Some(clause_no) = params.clause_no {
        request = request.with_clause(clause_no);
    }
    if let Some(subclause_no) = params.subclause_no {
        request = request.with_subclause(subclause_no);
    }

    let outcome = state.service.lookup(&request).await;
    (
        StatusCode::OK,
        Json(LawResponse {
            record: outcome.record,
            enrichment: outcome.enrichment,
            cache_hit: outcome.cache_hit,
        }),
    )
}

async fn recent_handler(State(state): State<AppState>) -> Json<Vec<RecentLookup>> {
    Json(state.service.recent())
}
