//! Symptom journal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::assistant::chat::{relay_chat, ChatReply, ChatRequest};
use crate::assistant::prompts::{SYMPTOM_INSIGHT_CONTEXT, SYMPTOM_INSIGHT_TEMPLATE};
use crate::errors::AppError;
use crate::llm_client::{ChatMessage, LlmClient};
use crate::models::tracking::SymptomEntryRow;

const SYMPTOM_COLUMNS: &str = "id, user_id, symptoms, severity, notes, created_at";

pub const MIN_LEVEL: i32 = 1;
pub const MAX_LEVEL: i32 = 10;

/// Fewer entries than this give no pattern worth analyzing.
pub const MIN_INSIGHT_ENTRIES: usize = 2;
const INSIGHT_RECENT_ENTRIES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    /// Buckets a 1-10 level: up to 3 is mild, up to 6 moderate, above that severe.
    pub fn for_level(level: i32) -> Result<Self, AppError> {
        match level {
            MIN_LEVEL..=3 => Ok(Severity::Mild),
            4..=6 => Ok(Severity::Moderate),
            7..=MAX_LEVEL => Ok(Severity::Severe),
            _ => Err(AppError::Validation(format!(
                "severity level must be between {MIN_LEVEL} and {MAX_LEVEL}"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddSymptomsRequest {
    pub user_id: Uuid,
    /// Comma-separated, e.g. "headache, fatigue".
    pub symptoms: String,
    pub level: i32,
    pub notes: Option<String>,
}

/// Counts over a symptom history.
#[derive(Debug, Default, Serialize)]
pub struct SymptomSummary {
    pub total_entries: usize,
    pub symptom_counts: BTreeMap<String, u32>,
    pub severity_counts: BTreeMap<String, u32>,
}

/// Comma-split, trimmed, blanks dropped.
pub fn parse_symptoms(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn add_symptoms(
    pool: &PgPool,
    request: &AddSymptomsRequest,
) -> Result<SymptomEntryRow, AppError> {
    let symptoms = parse_symptoms(&request.symptoms);
    if symptoms.is_empty() {
        return Err(AppError::Validation(
            "at least one symptom is required".to_string(),
        ));
    }
    let severity = Severity::for_level(request.level)?;
    let notes = request
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let sql = format!(
        "INSERT INTO user_symptoms (user_id, symptoms, severity, notes) \
         VALUES ($1, $2, $3, $4) RETURNING {SYMPTOM_COLUMNS}"
    );
    Ok(sqlx::query_as::<_, SymptomEntryRow>(&sql)
        .bind(request.user_id)
        .bind(&symptoms)
        .bind(severity.as_str())
        .bind(notes)
        .fetch_one(pool)
        .await?)
}

/// Newest first.
pub async fn symptom_history(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<SymptomEntryRow>, AppError> {
    let sql = format!(
        "SELECT {SYMPTOM_COLUMNS} FROM user_symptoms WHERE user_id = $1 \
         ORDER BY created_at DESC LIMIT $2"
    );
    Ok(sqlx::query_as::<_, SymptomEntryRow>(&sql)
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?)
}

pub fn summarize(entries: &[SymptomEntryRow]) -> SymptomSummary {
    let mut summary = SymptomSummary {
        total_entries: entries.len(),
        ..SymptomSummary::default()
    };
    for entry in entries {
        for symptom in &entry.symptoms {
            *summary.symptom_counts.entry(symptom.clone()).or_insert(0) += 1;
        }
        if let Some(severity) = &entry.severity {
            *summary.severity_counts.entry(severity.clone()).or_insert(0) += 1;
        }
    }
    summary
}

/// Symptoms of the newest `n` entries, in history order.
pub fn recent_symptoms(entries: &[SymptomEntryRow], n: usize) -> Vec<&str> {
    entries
        .iter()
        .take(n)
        .flat_map(|e| e.symptoms.iter().map(String::as_str))
        .collect()
}

fn format_counts(counts: &BTreeMap<String, u32>) -> String {
    counts
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn insight_prompt(summary: &SymptomSummary, recent: &[&str]) -> String {
    SYMPTOM_INSIGHT_TEMPLATE
        .replace("{total}", &summary.total_entries.to_string())
        .replace("{recent}", &recent.join(", "))
        .replace("{frequency}", &format_counts(&summary.symptom_counts))
        .replace("{severity}", &format_counts(&summary.severity_counts))
}

/// Free-text insights over a symptom history (newest first). Goes through the
/// chat relay, so the same screening and reply sanitizing apply.
pub async fn symptom_insight(
    llm: &LlmClient,
    entries: &[SymptomEntryRow],
) -> Result<ChatReply, AppError> {
    if entries.len() < MIN_INSIGHT_ENTRIES {
        return Err(AppError::Validation(format!(
            "at least {MIN_INSIGHT_ENTRIES} symptom entries are needed for insights"
        )));
    }
    let prompt = insight_prompt(
        &summarize(entries),
        &recent_symptoms(entries, INSIGHT_RECENT_ENTRIES),
    );
    let request = ChatRequest {
        messages: vec![ChatMessage::user(prompt)],
        context: Some(SYMPTOM_INSIGHT_CONTEXT.to_string()),
    };
    relay_chat(llm, &request).await
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_parse_symptoms() {
        assert_eq!(
            parse_symptoms(" headache,fatigue , ,nausea,"),
            vec!["headache", "fatigue", "nausea"]
        );
        assert!(parse_symptoms(" , ,").is_empty());
    }

    #[test]
    fn test_severity_buckets() {
        assert_eq!(Severity::for_level(1).unwrap(), Severity::Mild);
        assert_eq!(Severity::for_level(3).unwrap(), Severity::Mild);
        assert_eq!(Severity::for_level(4).unwrap(), Severity::Moderate);
        assert_eq!(Severity::for_level(6).unwrap(), Severity::Moderate);
        assert_eq!(Severity::for_level(7).unwrap(), Severity::Severe);
        assert_eq!(Severity::for_level(10).unwrap(), Severity::Severe);
    }

    #[test]
    fn test_severity_rejects_out_of_range() {
        assert!(matches!(Severity::for_level(0), Err(AppError::Validation(_))));
        assert!(matches!(Severity::for_level(11), Err(AppError::Validation(_))));
        assert!(matches!(Severity::for_level(-1), Err(AppError::Validation(_))));
        assert!(matches!(Severity::for_level(300), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_request_accepts_any_integer_level() {
        let request: AddSymptomsRequest = serde_json::from_str(
            r#"{"user_id": "0b7e4a52-63a2-4b1f-9d3e-0d2b9c1c6f10", "symptoms": "headache", "level": 300}"#,
        )
        .unwrap();
        assert_eq!(request.level, 300);
        assert!(Severity::for_level(request.level).is_err());
    }

    fn entry(symptoms: &[&str], severity: &str) -> SymptomEntryRow {
        SymptomEntryRow {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            severity: Some(severity.into()),
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn offline_llm() -> LlmClient {
        LlmClient::new("unused".into())
            .unwrap()
            .with_endpoint("http://127.0.0.1:9/unused")
    }

    #[tokio::test]
    async fn test_insight_needs_two_entries() {
        let llm = offline_llm();
        let result = symptom_insight(&llm, &[entry(&["headache"], "mild")]).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        let result = symptom_insight(&llm, &[]).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_insight_prompt_is_screened() {
        let entries = [
            entry(&["overdose"], "severe"),
            entry(&["headache"], "mild"),
        ];
        let reply = symptom_insight(&offline_llm(), &entries).await.unwrap();
        assert!(reply.blocked);
    }

    #[test]
    fn test_insight_prompt_uses_newest_five_entries() {
        let mut entries: Vec<SymptomEntryRow> =
            (0..6).map(|i| entry(&[&format!("s{i}")], "mild")).collect();
        entries[0].symptoms.push("fatigue".into());
        let recent = recent_symptoms(&entries, 5);
        assert_eq!(recent, vec!["s0", "fatigue", "s1", "s2", "s3", "s4"]);

        let prompt = insight_prompt(&summarize(&entries), &recent);
        assert!(prompt.contains("Total entries: 6"));
        assert!(prompt.contains("Recent symptoms (last 5 entries): s0, fatigue, s1, s2, s3, s4"));
        assert!(prompt.contains("Severity distribution: mild: 6"));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn test_summarize_counts() {
        let summary = summarize(&[
            entry(&["headache", "fatigue"], "mild"),
            entry(&["headache"], "severe"),
        ]);
        assert_eq!(summary.total_entries, 2);
        assert_eq!(summary.symptom_counts["headache"], 2);
        assert_eq!(summary.symptom_counts["fatigue"], 1);
        assert_eq!(summary.severity_counts["mild"], 1);
        assert_eq!(summary.severity_counts["severe"], 1);
    }
}
