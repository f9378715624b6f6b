//! AI remedy generation: supplements dataset hits with LLM-suggested remedies.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::assistant::cache::RemedyCache;
use crate::assistant::guardrails::{screen, BlockReason, Screening};
use crate::assistant::prompts::{
    remedy_system, ADDITIONAL_REMEDIES_TEMPLATE, FRESH_REMEDIES_TEMPLATE, REMEDY_SAMPLING,
    REMEDY_SCHEMA,
};
use crate::errors::AppError;
use crate::llm_client::{strip_json_fences, LlmClient};
use crate::models::remedy::AiRemedy;

#[derive(Debug, Clone, Default, Serialize)]
pub struct AiRemedyOutcome {
    pub remedies: Vec<AiRemedy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked: Option<BlockReason>,
    pub cached: bool,
}

/// Screens the query, serves from cache when possible, otherwise asks the LLM
/// for remedies not already in `dataset_names`.
pub async fn generate_ai_remedies(
    llm: &LlmClient,
    cache: &dyn RemedyCache,
    query: &str,
    dataset_names: &[String],
) -> Result<AiRemedyOutcome, AppError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("query cannot be empty".to_string()));
    }

    if let Screening::Blocked(reason) = screen(query) {
        info!("Blocked AI remedy request ({reason:?})");
        return Ok(AiRemedyOutcome {
            blocked: Some(reason),
            ..AiRemedyOutcome::default()
        });
    }

    if let Some(remedies) = cache.get(query).await {
        return Ok(AiRemedyOutcome {
            remedies,
            blocked: None,
            cached: true,
        });
    }

    let prompt = build_remedy_prompt(query, dataset_names);
    let text = llm.complete(&remedy_system(), &prompt, REMEDY_SAMPLING).await?;
    let remedies = parse_ai_remedies(&text, query);
    info!("Generated {} AI remedies for '{query}'", remedies.len());

    if !remedies.is_empty() {
        cache.put(query, &remedies).await;
    }

    Ok(AiRemedyOutcome {
        remedies,
        blocked: None,
        cached: false,
    })
}

pub fn build_remedy_prompt(query: &str, dataset_names: &[String]) -> String {
    let intro = if dataset_names.is_empty() {
        FRESH_REMEDIES_TEMPLATE.replace("{query}", query)
    } else {
        let names = serde_json::to_string(dataset_names).unwrap_or_default();
        ADDITIONAL_REMEDIES_TEMPLATE
            .replace("{count}", &dataset_names.len().to_string())
            .replace("{query}", query)
            .replace("{names}", &names)
    };
    format!("{intro}\n{}", REMEDY_SCHEMA.replace("{query}", query))
}

/// Lenient parse of the model's reply. Anything that is not a JSON array of
/// remedies yields an empty list; individual malformed items are skipped.
pub fn parse_ai_remedies(text: &str, query: &str) -> Vec<AiRemedy> {
    let Some(items) = extract_array(text) else {
        warn!("AI remedy response was not a JSON array; ignoring it");
        return vec![];
    };

    items
        .into_iter()
        .filter_map(|item| {
            serde_json::from_value::<AiRemedy>(item)
                .map_err(|e| debug!("Skipping malformed AI remedy: {e}"))
                .ok()
        })
        .filter(|r| !r.name.trim().is_empty() && !r.remedy.trim().is_empty())
        .map(|mut r| {
            if r.health_issue.trim().is_empty() {
                r.health_issue = query.to_string();
            }
            r
        })
        .collect()
}

fn extract_array(text: &str) -> Option<Vec<Value>> {
    let cleaned = strip_json_fences(text);
    if let Ok(Value::Array(items)) = serde_json::from_str(cleaned) {
        return Some(items);
    }

    // Tolerate prose around the array.
    let start = cleaned.find('[')?;
    let end = cleaned.rfind(']')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str(&cleaned[start..=end]) {
        Ok(Value::Array(items)) => Some(items),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::cache::testing::MemoryRemedyCache;

    #[test]
    fn test_parse_fenced_array() {
        let text = r#"```json
[
  {"name": "Peppermint tea", "healthIssue": "Headache", "remedy": "Steep for 5 minutes.", "source": "AI-Generated"},
  {"name": "Cold compress", "healthIssue": "Headache", "remedy": "Apply for 15 minutes."}
]
```"#;
        let remedies = parse_ai_remedies(text, "headache");
        assert_eq!(remedies.len(), 2);
        assert_eq!(remedies[0].name, "Peppermint tea");
        assert_eq!(remedies[1].health_issue, "Headache");
    }

    #[test]
    fn test_parse_skips_malformed_items_and_fills_issue() {
        let text = r#"[
            {"name": "Honey", "remedy": "One spoon at night."},
            {"healthIssue": "Cough"},
            {"name": "", "remedy": "nameless"},
            42
        ]"#;
        let remedies = parse_ai_remedies(text, "dry cough");
        assert_eq!(remedies.len(), 1);
        assert_eq!(remedies[0].health_issue, "dry cough");
    }

    #[test]
    fn test_parse_non_array_is_empty() {
        assert!(parse_ai_remedies(r#"{"name": "Honey"}"#, "cough").is_empty());
        assert!(parse_ai_remedies("I cannot help with that.", "cough").is_empty());
        assert!(parse_ai_remedies("", "cough").is_empty());
    }

    #[test]
    fn test_parse_array_wrapped_in_prose() {
        let text = "Here you go:\n[{\"name\": \"Fennel\", \"remedy\": \"Chew seeds.\"}]\nStay well!";
        let remedies = parse_ai_remedies(text, "bloating");
        assert_eq!(remedies.len(), 1);
        assert_eq!(remedies[0].name, "Fennel");
    }

    #[test]
    fn test_prompt_lists_dataset_names() {
        let prompt = build_remedy_prompt("cough", &["Honey".to_string(), "Tulsi".to_string()]);
        assert!(prompt.contains("has 2 remedies for \"cough\""));
        assert!(prompt.contains(r#"["Honey","Tulsi"]"#));
        assert!(prompt.contains(r#""healthIssue": "cough""#));
    }

    #[test]
    fn test_prompt_without_dataset_hits() {
        let prompt = build_remedy_prompt("hiccups", &[]);
        assert!(prompt.starts_with("Suggest 5-7 home remedies for \"hiccups\"."));
    }

    #[tokio::test]
    async fn test_blocked_query_skips_llm() {
        let llm = LlmClient::new("unused".into())
            .unwrap()
            .with_endpoint("http://127.0.0.1:9/unused");
        let cache = MemoryRemedyCache::default();
        let outcome = generate_ai_remedies(&llm, &cache, "miracle cure for diabetes", &[])
            .await
            .unwrap();
        assert_eq!(outcome.blocked, Some(BlockReason::HallucinationPrevention));
        assert!(outcome.remedies.is_empty());
    }

    #[tokio::test]
    async fn test_cache_hit_skips_llm() {
        let llm = LlmClient::new("unused".into())
            .unwrap()
            .with_endpoint("http://127.0.0.1:9/unused");
        let cache = MemoryRemedyCache::default();
        let cached = AiRemedy {
            name: "Steam inhalation".into(),
            health_issue: "Congestion".into(),
            remedy: "Inhale steam for 10 minutes.".into(),
            yogasan: None,
            acupressure: None,
            benefits: None,
            precautions: None,
            duration: None,
        };
        cache.put("congestion", &[cached.clone()]).await;

        let outcome = generate_ai_remedies(&llm, &cache, "  Congestion ", &[])
            .await
            .unwrap();
        assert!(outcome.cached);
        assert_eq!(outcome.remedies, vec![cached]);
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected() {
        let llm = LlmClient::new("unused".into()).unwrap();
        let cache = MemoryRemedyCache::default();
        let result = generate_ai_remedies(&llm, &cache, "   ", &[]).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
