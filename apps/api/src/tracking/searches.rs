use std::collections::BTreeMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::tracking::HealthSearchRow;

const SEARCH_COLUMNS: &str = "id, user_id, health_issue, category, searched_at";

pub async fn record_search(
    pool: &PgPool,
    user_id: Uuid,
    health_issue: &str,
    category: Option<&str>,
) -> Result<HealthSearchRow, AppError> {
    let health_issue = health_issue.trim();
    if health_issue.is_empty() {
        return Err(AppError::Validation(
            "health_issue cannot be empty".to_string(),
        ));
    }
    let category = category.map(str::trim).filter(|c| !c.is_empty());

    let sql = format!(
        "INSERT INTO health_searches (user_id, health_issue, category) \
         VALUES ($1, $2, $3) RETURNING {SEARCH_COLUMNS}"
    );
    Ok(sqlx::query_as::<_, HealthSearchRow>(&sql)
        .bind(user_id)
        .bind(health_issue)
        .bind(category)
        .fetch_one(pool)
        .await?)
}

/// Newest first.
pub async fn recent_searches(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<HealthSearchRow>, AppError> {
    let sql = format!(
        "SELECT {SEARCH_COLUMNS} FROM health_searches WHERE user_id = $1 \
         ORDER BY searched_at DESC NULLS LAST LIMIT $2"
    );
    Ok(sqlx::query_as::<_, HealthSearchRow>(&sql)
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?)
}

/// How often each health issue was searched.
pub fn search_patterns(searches: &[HealthSearchRow]) -> BTreeMap<String, u32> {
    let mut patterns = BTreeMap::new();
    for search in searches {
        *patterns.entry(search.health_issue.clone()).or_insert(0) += 1;
    }
    patterns
}
