pub mod health;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::assistant::handlers as assistant;
use crate::catalog::handlers as catalog;
use crate::state::AppState;
use crate::tracking::handlers as tracking;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Remedy search
        .route(
            "/api/v1/remedies/search",
            get(catalog::handle_search).post(catalog::handle_combined_search),
        )
        .route(
            "/api/v1/remedies/suggestions",
            get(catalog::handle_suggestions),
        )
        .route("/api/v1/remedies/categories", get(catalog::handle_categories))
        .route(
            "/api/v1/remedies/health-issues",
            get(catalog::handle_health_issues),
        )
        // AI relay
        .route("/api/v1/remedies/ai", post(assistant::handle_ai_remedies))
        .route("/api/v1/assistant/chat", post(assistant::handle_chat))
        // Saved remedies
        .route(
            "/api/v1/saved",
            get(tracking::handle_list_saved).post(tracking::handle_save_remedy),
        )
        .route("/api/v1/saved/:id", delete(tracking::handle_delete_saved))
        .route("/api/v1/saved/:id/rating", patch(tracking::handle_rate_saved))
        .route("/api/v1/saved/:id/tried", patch(tracking::handle_mark_tried))
        .route(
            "/api/v1/saved/:id/favorite",
            patch(tracking::handle_set_favorite),
        )
        .route("/api/v1/saved/:id/notes", patch(tracking::handle_update_notes))
        // History
        .route(
            "/api/v1/searches",
            get(tracking::handle_recent_searches).post(tracking::handle_record_search),
        )
        .route(
            "/api/v1/symptoms",
            get(tracking::handle_symptom_history).post(tracking::handle_add_symptoms),
        )
        .route(
            "/api/v1/symptoms/insights",
            post(tracking::handle_symptom_insights),
        )
        // Dashboard
        .route("/api/v1/dashboard", get(tracking::handle_dashboard))
        .route(
            "/api/v1/dashboard/insights",
            post(tracking::handle_insights),
        )
        .with_state(state)
}
