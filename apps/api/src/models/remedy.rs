use serde::{Deserialize, Deserializer, Serialize};

use crate::search::{FieldMatch, Searchable};

pub const KEY_NAME: &str = "name";
pub const KEY_HEALTH_ISSUE: &str = "health_issue";
pub const KEY_REMEDY: &str = "remedy";

/// A static dataset record. Accepts the dataset's column names, writes snake_case.
/// Missing or null text columns read as empty; nameless rows are dropped by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remedy {
    #[serde(alias = "Name of Item", default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(alias = "Health Issue", default, deserialize_with = "null_as_empty")]
    pub health_issue: String,
    #[serde(alias = "Home Remedy", default, deserialize_with = "null_as_empty")]
    pub remedy: String,
    #[serde(alias = "Yogasan", default, skip_serializing_if = "Option::is_none")]
    pub yogasan: Option<String>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Searchable for Remedy {
    fn field(&self, key: &str) -> Option<&str> {
        match key {
            KEY_NAME => Some(&self.name),
            KEY_HEALTH_ISSUE => Some(&self.health_issue),
            KEY_REMEDY => Some(&self.remedy),
            _ => None,
        }
    }
}

/// A remedy produced by the LLM. Accepts the model's camelCase keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiRemedy {
    pub name: String,
    #[serde(alias = "healthIssue", default)]
    pub health_issue: String,
    pub remedy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yogasan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acupressure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefits: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precautions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// A dataset record with its fuzzy score (lower is closer).
#[derive(Debug, Clone, Serialize)]
pub struct ScoredRemedy {
    #[serde(flatten)]
    pub remedy: Remedy,
    pub score: f64,
    /// Per-field scores (and ranges when enabled) behind `score`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<FieldMatch>,
}

/// One entry of a merged result list.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CombinedRemedy {
    Dataset(ScoredRemedy),
    AiGenerated(AiRemedy),
}

impl CombinedRemedy {
    pub fn name(&self) -> &str {
        match self {
            CombinedRemedy::Dataset(r) => &r.remedy.name,
            CombinedRemedy::AiGenerated(r) => &r.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remedy_reads_dataset_columns() {
        let json = r#"{
            "Name of Item": "Ginger",
            "Health Issue": "Nausea",
            "Home Remedy": "Chew a thin slice of fresh ginger.",
            "Yogasan": "Vajrasana"
        }"#;
        let remedy: Remedy = serde_json::from_str(json).unwrap();
        assert_eq!(remedy.name, "Ginger");
        assert_eq!(remedy.health_issue, "Nausea");
        assert_eq!(remedy.yogasan.as_deref(), Some("Vajrasana"));
    }

    #[test]
    fn test_remedy_tolerates_null_and_missing_columns() {
        let remedy: Remedy =
            serde_json::from_str(r#"{"Name of Item": "Aloe", "Health Issue": null}"#).unwrap();
        assert_eq!(remedy.name, "Aloe");
        assert_eq!(remedy.health_issue, "");
        assert_eq!(remedy.remedy, "");

        let nameless: Remedy =
            serde_json::from_str(r#"{"Name of Item": null, "Home Remedy": "Rest."}"#).unwrap();
        assert!(nameless.name.is_empty());

        let keyless: Remedy = serde_json::from_str(r#"{"Health Issue": "Cold"}"#).unwrap();
        assert!(keyless.name.is_empty());
    }

    #[test]
    fn test_remedy_serializes_snake_case() {
        let remedy = Remedy {
            name: "Tulsi".into(),
            health_issue: "Cough".into(),
            remedy: "Steep leaves".into(),
            yogasan: None,
        };
        let value = serde_json::to_value(&remedy).unwrap();
        assert_eq!(value["health_issue"], "Cough");
        assert!(value.get("yogasan").is_none());
        let back: Remedy = serde_json::from_value(value).unwrap();
        assert_eq!(back, remedy);
    }

    #[test]
    fn test_ai_remedy_accepts_camel_case() {
        let json = r#"{
            "name": "Peppermint oil",
            "healthIssue": "Headache",
            "remedy": "Massage onto temples.",
            "acupressure": "LI4",
            "source": "AI-Generated"
        }"#;
        let remedy: AiRemedy = serde_json::from_str(json).unwrap();
        assert_eq!(remedy.health_issue, "Headache");
        assert_eq!(remedy.acupressure.as_deref(), Some("LI4"));
    }

    #[test]
    fn test_combined_remedy_is_tagged_by_source() {
        let ai = CombinedRemedy::AiGenerated(AiRemedy {
            name: "Fennel".into(),
            health_issue: "Bloating".into(),
            remedy: "Chew seeds after meals.".into(),
            yogasan: None,
            acupressure: None,
            benefits: None,
            precautions: None,
            duration: None,
        });
        let value = serde_json::to_value(&ai).unwrap();
        assert_eq!(value["source"], "ai_generated");

        let dataset = CombinedRemedy::Dataset(ScoredRemedy {
            remedy: Remedy {
                name: "Clove".into(),
                health_issue: "Toothache".into(),
                remedy: "Bite gently".into(),
                yogasan: None,
            },
            score: 0.01,
            matches: vec![],
        });
        let value = serde_json::to_value(&dataset).unwrap();
        assert_eq!(value["source"], "dataset");
        assert_eq!(value["name"], "Clove");
        assert_eq!(dataset.name(), "Clove");
    }
}
