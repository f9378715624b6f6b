use axum::{extract::State, Json};
use serde::Deserialize;

use crate::assistant::chat::{relay_chat, ChatReply, ChatRequest};
use crate::assistant::generator::{generate_ai_remedies, AiRemedyOutcome};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AiRemediesRequest {
    pub query: String,
}

/// POST /api/v1/remedies/ai
///
/// AI remedies only. Dataset names for the query are looked up here so the
/// model is asked for remedies the dataset does not already cover.
pub async fn handle_ai_remedies(
    State(state): State<AppState>,
    Json(request): Json<AiRemediesRequest>,
) -> Result<Json<AiRemedyOutcome>, AppError> {
    let dataset_names = state.catalog.matching_names(&request.query);
    let outcome = generate_ai_remedies(
        &state.llm,
        state.ai_cache.as_ref(),
        &request.query,
        &dataset_names,
    )
    .await?;
    Ok(Json(outcome))
}

/// POST /api/v1/assistant/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, AppError> {
    let reply = relay_chat(&state.llm, &request).await?;
    Ok(Json(reply))
}
