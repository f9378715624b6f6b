//! Saved remedies: a user's collection, with rating, tried and favorite flags.

use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::tracking::SavedRemedyRow;

const SAVED_COLUMNS: &str = "id, user_id, remedy_name, health_issue, remedy_details, source, \
     is_favorite, tried, effectiveness_rating, notes, created_at, updated_at";

const UNIQUE_VIOLATION: &str = "23505";

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemedySource {
    Ai,
    #[default]
    Database,
}

impl RemedySource {
    pub fn as_str(self) -> &'static str {
        match self {
            RemedySource::Ai => "ai",
            RemedySource::Database => "database",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveRemedyRequest {
    pub user_id: Uuid,
    pub name: String,
    #[serde(alias = "healthIssue")]
    pub health_issue: String,
    pub remedy: String,
    pub yogasan: Option<String>,
    pub acupressure: Option<String>,
    #[serde(default)]
    pub source: RemedySource,
}

/// One field change on a saved remedy.
#[derive(Debug, Clone, PartialEq)]
pub enum SavedUpdate {
    Rating(i32),
    Tried(bool),
    Favorite(bool),
    Notes(Option<String>),
}

impl SavedUpdate {
    fn column(&self) -> &'static str {
        match self {
            SavedUpdate::Rating(_) => "effectiveness_rating",
            SavedUpdate::Tried(_) => "tried",
            SavedUpdate::Favorite(_) => "is_favorite",
            SavedUpdate::Notes(_) => "notes",
        }
    }

    /// Rejects out-of-range ratings; blank notes become `None`.
    pub fn validated(self) -> Result<Self, AppError> {
        match self {
            SavedUpdate::Rating(r) if !(MIN_RATING..=MAX_RATING).contains(&r) => {
                Err(AppError::Validation(format!(
                    "rating must be between {MIN_RATING} and {MAX_RATING}"
                )))
            }
            SavedUpdate::Notes(notes) => Ok(SavedUpdate::Notes(
                notes
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty()),
            )),
            other => Ok(other),
        }
    }
}

pub async fn save_remedy(
    pool: &PgPool,
    request: &SaveRemedyRequest,
) -> Result<SavedRemedyRow, AppError> {
    let name = request.name.trim();
    let health_issue = request.health_issue.trim();
    if name.is_empty() || health_issue.is_empty() {
        return Err(AppError::Validation(
            "name and health_issue are required".to_string(),
        ));
    }

    let details = json!({
        "remedy": request.remedy,
        "yogasan": request.yogasan,
        "acupressure": request.acupressure,
    });

    let sql = format!(
        "INSERT INTO saved_remedies (user_id, remedy_name, health_issue, remedy_details, source) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {SAVED_COLUMNS}"
    );
    let row = sqlx::query_as::<_, SavedRemedyRow>(&sql)
        .bind(request.user_id)
        .bind(name)
        .bind(health_issue)
        .bind(&details)
        .bind(request.source.as_str())
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("This remedy is already in your collection".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

    info!("User {} saved remedy '{}'", request.user_id, row.remedy_name);
    Ok(row)
}

/// Newest first.
pub async fn list_saved(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<SavedRemedyRow>, AppError> {
    let sql = format!(
        "SELECT {SAVED_COLUMNS} FROM saved_remedies WHERE user_id = $1 \
         ORDER BY created_at DESC NULLS LAST LIMIT $2"
    );
    Ok(sqlx::query_as::<_, SavedRemedyRow>(&sql)
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?)
}

pub async fn update_saved(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    update: SavedUpdate,
) -> Result<SavedRemedyRow, AppError> {
    let update = update.validated()?;
    let sql = format!(
        "UPDATE saved_remedies SET {} = $1, updated_at = now() \
         WHERE id = $2 AND user_id = $3 RETURNING {SAVED_COLUMNS}",
        update.column()
    );

    let query = sqlx::query_as::<_, SavedRemedyRow>(&sql);
    let query = match update {
        SavedUpdate::Rating(rating) => query.bind(rating),
        SavedUpdate::Tried(flag) | SavedUpdate::Favorite(flag) => query.bind(flag),
        SavedUpdate::Notes(notes) => query.bind(notes),
    };

    query
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Saved remedy {id} not found")))
}

pub async fn delete_saved(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM saved_remedies WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Saved remedy {id} not found")));
    }
    Ok(())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}
