use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assistant::chat::ChatReply;
use crate::assistant::insights::{generate_insights, WellnessInsights};
use crate::errors::AppError;
use crate::models::tracking::{HealthSearchRow, SavedRemedyRow, SymptomEntryRow};
use crate::state::AppState;
use crate::tracking::dashboard::{load_dashboard, Dashboard};
use crate::tracking::saved::{
    delete_saved, list_saved, save_remedy, update_saved, SaveRemedyRequest, SavedUpdate,
};
use crate::tracking::searches::{record_search, recent_searches, search_patterns};
use crate::tracking::symptoms::{
    add_symptoms, summarize, symptom_history, symptom_insight, AddSymptomsRequest,
    SymptomSummary,
};
use crate::tracking::{clamp_limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub user_id: Uuid,
    pub limit: Option<i64>,
}

impl PageQuery {
    fn limit(&self) -> i64 {
        clamp_limit(self.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
    }
}

#[derive(Deserialize)]
pub struct RatingUpdate {
    pub user_id: Uuid,
    pub rating: i32,
}

#[derive(Deserialize)]
pub struct TriedUpdate {
    pub user_id: Uuid,
    pub tried: bool,
}

#[derive(Deserialize)]
pub struct FavoriteUpdate {
    pub user_id: Uuid,
    pub is_favorite: bool,
}

#[derive(Deserialize)]
pub struct NotesUpdate {
    pub user_id: Uuid,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct RecordSearchRequest {
    pub user_id: Uuid,
    pub health_issue: String,
    pub category: Option<String>,
}

#[derive(Serialize)]
pub struct SearchHistoryResponse {
    pub searches: Vec<HealthSearchRow>,
    pub search_patterns: BTreeMap<String, u32>,
}

#[derive(Serialize)]
pub struct SymptomHistoryResponse {
    pub entries: Vec<SymptomEntryRow>,
    pub summary: SymptomSummary,
}

// Saved remedies

/// GET /api/v1/saved
pub async fn handle_list_saved(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> Result<Json<Vec<SavedRemedyRow>>, AppError> {
    let saved = list_saved(&state.db, params.user_id, params.limit()).await?;
    Ok(Json(saved))
}

/// POST /api/v1/saved
pub async fn handle_save_remedy(
    State(state): State<AppState>,
    Json(req): Json<SaveRemedyRequest>,
) -> Result<(StatusCode, Json<SavedRemedyRow>), AppError> {
    let row = save_remedy(&state.db, &req).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PATCH /api/v1/saved/:id/rating
pub async fn handle_rate_saved(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RatingUpdate>,
) -> Result<Json<SavedRemedyRow>, AppError> {
    let row = update_saved(&state.db, req.user_id, id, SavedUpdate::Rating(req.rating)).await?;
    Ok(Json(row))
}

/// PATCH /api/v1/saved/:id/tried
pub async fn handle_mark_tried(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TriedUpdate>,
) -> Result<Json<SavedRemedyRow>, AppError> {
    let row = update_saved(&state.db, req.user_id, id, SavedUpdate::Tried(req.tried)).await?;
    Ok(Json(row))
}

/// PATCH /api/v1/saved/:id/favorite
pub async fn handle_set_favorite(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<FavoriteUpdate>,
) -> Result<Json<SavedRemedyRow>, AppError> {
    let row = update_saved(
        &state.db,
        req.user_id,
        id,
        SavedUpdate::Favorite(req.is_favorite),
    )
    .await?;
    Ok(Json(row))
}

/// PATCH /api/v1/saved/:id/notes
pub async fn handle_update_notes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<NotesUpdate>,
) -> Result<Json<SavedRemedyRow>, AppError> {
    let row = update_saved(&state.db, req.user_id, id, SavedUpdate::Notes(req.notes)).await?;
    Ok(Json(row))
}

/// DELETE /api/v1/saved/:id
pub async fn handle_delete_saved(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    delete_saved(&state.db, params.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Search history

/// GET /api/v1/searches
pub async fn handle_recent_searches(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> Result<Json<SearchHistoryResponse>, AppError> {
    let searches = recent_searches(&state.db, params.user_id, params.limit()).await?;
    Ok(Json(SearchHistoryResponse {
        search_patterns: search_patterns(&searches),
        searches,
    }))
}

/// POST /api/v1/searches
pub async fn handle_record_search(
    State(state): State<AppState>,
    Json(req): Json<RecordSearchRequest>,
) -> Result<(StatusCode, Json<HealthSearchRow>), AppError> {
    let row = record_search(
        &state.db,
        req.user_id,
        &req.health_issue,
        req.category.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

// Symptom journal

/// GET /api/v1/symptoms
pub async fn handle_symptom_history(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> Result<Json<SymptomHistoryResponse>, AppError> {
    let entries = symptom_history(&state.db, params.user_id, params.limit()).await?;
    Ok(Json(SymptomHistoryResponse {
        summary: summarize(&entries),
        entries,
    }))
}

/// POST /api/v1/symptoms
pub async fn handle_add_symptoms(
    State(state): State<AppState>,
    Json(req): Json<AddSymptomsRequest>,
) -> Result<(StatusCode, Json<SymptomEntryRow>), AppError> {
    let row = add_symptoms(&state.db, &req).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// POST /api/v1/symptoms/insights
pub async fn handle_symptom_insights(
    State(state): State<AppState>,
    Json(req): Json<UserIdQuery>,
) -> Result<Json<ChatReply>, AppError> {
    let entries = symptom_history(&state.db, req.user_id, DEFAULT_PAGE_SIZE).await?;
    Ok(Json(symptom_insight(&state.llm, &entries).await?))
}

// Dashboard

/// GET /api/v1/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Dashboard>, AppError> {
    Ok(Json(load_dashboard(&state.db, params.user_id).await?))
}

/// POST /api/v1/dashboard/insights
///
/// Builds the wellness profile from the same data the dashboard shows.
pub async fn handle_insights(
    State(state): State<AppState>,
    Json(req): Json<UserIdQuery>,
) -> Result<Json<WellnessInsights>, AppError> {
    let dashboard = load_dashboard(&state.db, req.user_id).await?;
    let insights = generate_insights(&state.llm, &dashboard.wellness_profile()).await?;
    Ok(Json(insights))
}
