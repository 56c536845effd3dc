use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::{HeaderValue, StatusCode}, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use vsm_core::persist::StorePaths;
use vsm_core::{IndexTerms, ScoredDoc, SearchSession, StandardPreprocessor, VsmError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Exhaustive,
    Indexed,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default)]
    pub mode: SearchMode,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub mode: SearchMode,
    pub took_ms: u128,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<ScoredDoc>,
}

#[derive(Serialize)]
pub struct TermWeight {
    pub term: String,
    pub weight: f32,
}

#[derive(Serialize)]
pub struct DocResponse {
    pub doc: String,
    pub terms: Vec<TermWeight>,
}

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SearchSession<StandardPreprocessor>>,
}

/// Startup settings for the query server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub store: PathBuf,
    /// Extra query stop words, one per line
    pub stop_words: Option<PathBuf>,
    pub index_terms: IndexTerms,
    /// Allowed CORS origins; empty allows any
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn new<P: Into<PathBuf>>(store: P) -> Self {
        Self { store: store.into(), stop_words: None, index_terms: IndexTerms::Raw, allowed_origins: Vec::new() }
    }
}

/// Open the configured store and build the router.
pub fn build_app(config: ServerConfig) -> Result<Router> {
    let mut preprocessor = StandardPreprocessor::new();
    if let Some(path) = &config.stop_words {
        preprocessor = preprocessor.with_stopwords_file(path)?;
    }
    let session = SearchSession::open(&StorePaths::new(&config.store), preprocessor)?
        .index_terms(config.index_terms);
    tracing::info!(
        store = %config.store.display(),
        num_docs = session.store().len(),
        dimension = session.model().dimension(),
        index_terms = ?config.index_terms,
        "search session ready"
    );
    Ok(router(AppState { session: Arc::new(session) }, &config.allowed_origins))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins.iter().filter_map(|s| s.trim().parse().ok()).collect();
    let allow = if origins.is_empty() { AllowOrigin::from(Any) } else { AllowOrigin::list(origins) };
    CorsLayer::new().allow_origin(allow).allow_methods(Any).allow_headers(Any)
}

pub fn router(app_state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc", get(doc_handler))
        .with_state(app_state)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    // ranking scans every stored vector, keep it off the async workers
    let session = Arc::clone(&state.session);
    let (q, k, mode) = (params.q.clone(), params.k, params.mode);
    let results = tokio::task::spawn_blocking(move || match mode {
        SearchMode::Exhaustive => session.search(&q, k),
        SearchMode::Indexed => session.search_indexed(&q),
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "search task failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?
    .map_err(internal)?;

    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, hits = results.len(), "search served");
    Ok(Json(SearchResponse {
        query: params.q,
        mode: params.mode,
        took_ms: elapsed.as_millis(),
        took_s: elapsed.as_secs_f64(),
        total_hits: results.len(),
        results,
    }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc): Path<String>,
) -> Result<Json<DocResponse>, (StatusCode, String)> {
    let terms = state
        .session
        .store()
        .nonzero_terms(state.session.model().vocabulary(), &doc)
        .map_err(|e| match e {
            VsmError::UnknownDocument(id) => (StatusCode::NOT_FOUND, format!("unknown document '{id}'")),
            other => internal(other),
        })?;
    let terms = terms
        .into_iter()
        .map(|(term, weight)| TermWeight { term: term.to_string(), weight })
        .collect();
    Ok(Json(DocResponse { doc, terms }))
}

fn internal(e: VsmError) -> (StatusCode, String) {
    tracing::error!(error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
