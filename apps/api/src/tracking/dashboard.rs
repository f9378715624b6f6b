use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::assistant::insights::{SavedRemedySummary, SearchSummary, WellnessProfile};
use crate::errors::AppError;
use crate::models::tracking::{HealthSearchRow, SavedRemedyRow};
use crate::tracking::saved::list_saved;
use crate::tracking::searches::{recent_searches, search_patterns};

pub const DASHBOARD_SAVED: i64 = 10;
pub const DASHBOARD_SEARCHES: i64 = 20;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub saved_remedies: Vec<SavedRemedyRow>,
    pub health_searches: Vec<HealthSearchRow>,
    pub search_patterns: BTreeMap<String, u32>,
    pub favorite_count: usize,
    pub tried_count: usize,
}

impl Dashboard {
    pub fn new(saved_remedies: Vec<SavedRemedyRow>, health_searches: Vec<HealthSearchRow>) -> Self {
        let search_patterns = search_patterns(&health_searches);
        let favorite_count = saved_remedies
            .iter()
            .filter(|r| r.is_favorite.unwrap_or(false))
            .count();
        let tried_count = saved_remedies
            .iter()
            .filter(|r| r.tried.unwrap_or(false))
            .count();
        Self {
            saved_remedies,
            health_searches,
            search_patterns,
            favorite_count,
            tried_count,
        }
    }

    /// What the insights prompt is told about this user.
    pub fn wellness_profile(&self) -> WellnessProfile {
        WellnessProfile {
            saved_remedies: self
                .saved_remedies
                .iter()
                .map(|r| SavedRemedySummary {
                    name: r.remedy_name.clone(),
                    health_issue: r.health_issue.clone(),
                    is_favorite: r.is_favorite.unwrap_or(false),
                    tried: r.tried.unwrap_or(false),
                })
                .collect(),
            health_searches: self
                .health_searches
                .iter()
                .map(|s| SearchSummary {
                    issue: s.health_issue.clone(),
                    category: s.category.clone(),
                })
                .collect(),
            search_patterns: self.search_patterns.clone(),
        }
    }
}

/// The 10 newest saved remedies and 20 newest searches, fetched concurrently.
pub async fn load_dashboard(pool: &PgPool, user_id: Uuid) -> Result<Dashboard, AppError> {
    let (saved, searches) = tokio::try_join!(
        list_saved(pool, user_id, DASHBOARD_SAVED),
        recent_searches(pool, user_id, DASHBOARD_SEARCHES),
    )?;
    Ok(Dashboard::new(saved, searches))
}
