//! Personalized wellness insights from a user's saved remedies and searches.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::assistant::prompts::{insights_system, INSIGHTS_PROMPT_TEMPLATE, INSIGHTS_SAMPLING};
use crate::errors::AppError;
use crate::llm_client::{LlmClient, LlmError};

/// What the LLM sees about the user.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WellnessProfile {
    pub saved_remedies: Vec<SavedRemedySummary>,
    pub health_searches: Vec<SearchSummary>,
    pub search_patterns: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedRemedySummary {
    pub name: String,
    pub health_issue: String,
    pub is_favorite: bool,
    pub tried: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchSummary {
    pub issue: String,
    pub category: Option<String>,
}

/// Percentages as strings, e.g. "65%".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStats {
    pub stress: String,
    #[serde(alias = "sleepImbalance")]
    pub sleep_imbalance: String,
    pub fatigue: String,
    pub digestion: String,
    pub immunity: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellnessInsights {
    #[serde(alias = "healthStats")]
    pub health_stats: HealthStats,
    pub analysis: String,
    #[serde(default)]
    pub recommendations: Value,
    #[serde(alias = "weeklyPlan", default)]
    pub weekly_plan: Vec<Value>,
}

impl WellnessInsights {
    /// Neutral answer used when the model's output cannot be read.
    pub fn fallback() -> Self {
        let neutral = || "50%".to_string();
        Self {
            health_stats: HealthStats {
                stress: neutral(),
                sleep_imbalance: neutral(),
                fatigue: neutral(),
                digestion: neutral(),
                immunity: neutral(),
            },
            analysis: "Unable to analyze wellness data right now. Please try again.".to_string(),
            recommendations: json!({
                "home_remedies": [],
                "yoga_poses": [],
                "acupressure": [],
                "diet": {"eat": [], "avoid": []},
                "lifestyle": [],
                "meditation": []
            }),
            weekly_plan: vec![],
        }
    }
}

pub async fn generate_insights(
    llm: &LlmClient,
    profile: &WellnessProfile,
) -> Result<WellnessInsights, AppError> {
    let user_data = if profile.saved_remedies.is_empty() && profile.health_searches.is_empty() {
        "No previous health data available - provide general wellness recommendations".to_string()
    } else {
        serde_json::to_string_pretty(profile).map_err(anyhow::Error::from)?
    };
    let prompt = INSIGHTS_PROMPT_TEMPLATE.replace("{user_data}", &user_data);

    match llm
        .call_json::<WellnessInsights>(&insights_system(), &prompt, INSIGHTS_SAMPLING)
        .await
    {
        Ok(insights) => Ok(insights),
        Err(LlmError::Parse(e)) => {
            warn!("Unreadable wellness insights from LLM, using fallback: {e}");
            Ok(WellnessInsights::fallback())
        }
        Err(LlmError::EmptyContent) => {
            warn!("Empty wellness insights from LLM, using fallback");
            Ok(WellnessInsights::fallback())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insights_accept_camel_case() {
        let json = r#"{
            "healthStats": {"stress": "65%", "sleepImbalance": "40%", "fatigue": "55%",
                            "digestion": "70%", "immunity": "60%"},
            "analysis": "Frequent searches for sleep issues.",
            "recommendations": {"diet": {"eat": ["oats"], "avoid": ["coffee"]}},
            "weeklyPlan": [{"day": "Monday", "morning": "Walk", "evening": "Stretch", "focus": "Sleep"}]
        }"#;
        let insights: WellnessInsights = serde_json::from_str(json).unwrap();
        assert_eq!(insights.health_stats.sleep_imbalance, "40%");
        assert_eq!(insights.weekly_plan.len(), 1);
        assert_eq!(insights.recommendations["diet"]["avoid"][0], "coffee");
    }

    #[test]
    fn test_insights_tolerate_missing_optional_sections() {
        let json = r#"{
            "health_stats": {"stress": "10%", "sleep_imbalance": "10%", "fatigue": "10%",
                             "digestion": "10%", "immunity": "90%"},
            "analysis": "Looking good."
        }"#;
        let insights: WellnessInsights = serde_json::from_str(json).unwrap();
        assert!(insights.weekly_plan.is_empty());
        assert!(insights.recommendations.is_null());
    }

    #[test]
    fn test_fallback_is_neutral() {
        let fallback = WellnessInsights::fallback();
        assert_eq!(fallback.health_stats.stress, "50%");
        assert_eq!(fallback.health_stats.immunity, "50%");
        assert!(fallback.weekly_plan.is_empty());
    }

    #[test]
    fn test_profile_serializes_patterns() {
        let mut profile = WellnessProfile::default();
        profile.search_patterns.insert("Cough".into(), 3);
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["search_patterns"]["Cough"], 3);
    }
}
