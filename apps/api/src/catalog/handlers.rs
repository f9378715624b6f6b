use std::collections::HashSet;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::assistant::generator::{generate_ai_remedies, AiRemedyOutcome};
use crate::assistant::guardrails::BlockReason;
use crate::errors::AppError;
use crate::models::remedy::{AiRemedy, CombinedRemedy, ScoredRemedy};
use crate::state::AppState;
use crate::tracking::{clamp_limit, searches::record_search};

/// Upper bound on dataset hits returned by one search.
pub const MAX_SEARCH_RESULTS: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub category: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<ScoredRemedy>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct CombinedSearchRequest {
    pub query: String,
    pub category: Option<String>,
    pub limit: Option<i64>,
    #[serde(default = "default_include_ai")]
    pub include_ai: bool,
    /// When present the search is recorded in the user's history.
    pub user_id: Option<Uuid>,
}

fn default_include_ai() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct CombinedSearchResponse {
    pub query: String,
    pub results: Vec<CombinedRemedy>,
    pub dataset_count: usize,
    pub ai_count: usize,
    pub ai_cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked: Option<BlockReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionParams {
    #[serde(default)]
    pub q: String,
}

/// GET /api/v1/remedies/search
///
/// Dataset matches only, best first.
pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let limit = clamp_limit(params.limit, MAX_SEARCH_RESULTS, MAX_SEARCH_RESULTS) as usize;
    let results = state
        .catalog
        .search(&params.q, params.category.as_deref(), Some(limit));

    Ok(Json(SearchResponse {
        query: params.q.trim().to_string(),
        total: results.len(),
        results,
    }))
}

/// POST /api/v1/remedies/search
///
/// Dataset hits merged with AI suggestions. The AI half runs alongside the
/// history write; its failure is reported in `ai_error` and never fails the
/// dataset half.
pub async fn handle_combined_search(
    State(state): State<AppState>,
    Json(request): Json<CombinedSearchRequest>,
) -> Result<Json<CombinedSearchResponse>, AppError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("query cannot be empty".to_string()));
    }

    let limit = clamp_limit(request.limit, MAX_SEARCH_RESULTS, MAX_SEARCH_RESULTS) as usize;
    let category = request.category.as_deref();
    let dataset = state.catalog.search(query, category, Some(limit));

    let ai = async {
        if !request.include_ai {
            return None;
        }
        let dataset_names = state.catalog.matching_names(query);
        Some(
            generate_ai_remedies(
                &state.llm,
                state.ai_cache.as_ref(),
                query,
                &dataset_names,
            )
            .await,
        )
    };
    let history = async {
        let Some(user_id) = request.user_id else {
            return;
        };
        if let Err(e) = record_search(&state.db, user_id, query, category).await {
            warn!("Failed to record search for user {user_id}: {e}");
        }
    };
    let (ai, ()) = tokio::join!(ai, history);

    let (outcome, ai_error) = match ai {
        None => (AiRemedyOutcome::default(), None),
        Some(Ok(outcome)) => (outcome, None),
        Some(Err(e)) => {
            warn!("AI remedies unavailable for '{query}': {e}");
            (AiRemedyOutcome::default(), Some(e.public_message()))
        }
    };

    let dataset_count = dataset.len();
    let results = merge_results(dataset, outcome.remedies);
    Ok(Json(CombinedSearchResponse {
        query: query.to_string(),
        ai_count: results.len() - dataset_count,
        dataset_count,
        results,
        ai_cached: outcome.cached,
        blocked: outcome.blocked,
        ai_error,
    }))
}

/// GET /api/v1/remedies/suggestions
pub async fn handle_suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionParams>,
) -> Json<Vec<String>> {
    Json(state.catalog.suggestions(&params.q))
}

/// GET /api/v1/remedies/categories
pub async fn handle_categories(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.categories().to_vec())
}

/// GET /api/v1/remedies/health-issues
pub async fn handle_health_issues(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.health_issues().to_vec())
}

/// Dataset hits first, then AI remedies whose names the dataset does not
/// already show (case-insensitive).
pub fn merge_results(dataset: Vec<ScoredRemedy>, ai: Vec<AiRemedy>) -> Vec<CombinedRemedy> {
    let mut seen: HashSet<String> = dataset
        .iter()
        .map(|hit| hit.remedy.name.trim().to_lowercase())
        .collect();

    let ai = ai
        .into_iter()
        .filter(|r| seen.insert(r.name.trim().to_lowercase()))
        .map(CombinedRemedy::AiGenerated);

    dataset
        .into_iter()
        .map(CombinedRemedy::Dataset)
        .chain(ai)
        .collect()
}
