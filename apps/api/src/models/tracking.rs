use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SavedRemedyRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub remedy_name: String,
    pub health_issue: String,
    pub remedy_details: Value,
    pub source: Option<String>,
    pub is_favorite: Option<bool>,
    pub tried: Option<bool>,
    pub effectiveness_rating: Option<i32>,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HealthSearchRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub health_issue: String,
    pub category: Option<String>,
    pub searched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SymptomEntryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub symptoms: Vec<String>,
    pub severity: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
