// Prompt constants for the assistant features.
// Placeholders in braces are replaced before sending.

use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, SAFETY_INSTRUCTION};
use crate::llm_client::Sampling;

pub const REMEDY_SAMPLING: Sampling = Sampling {
    temperature: 0.8,
    max_tokens: 2048,
    top_p: 0.95,
};

pub const CHAT_SAMPLING: Sampling = Sampling {
    temperature: 0.6,
    max_tokens: 2000,
    top_p: 0.9,
};

pub const INSIGHTS_SAMPLING: Sampling = Sampling {
    temperature: 0.7,
    max_tokens: 3000,
    top_p: 0.95,
};

pub fn remedy_system() -> String {
    format!(
        "You are a natural home remedies expert. {SAFETY_INSTRUCTION} {JSON_ONLY_SYSTEM}"
    )
}

/// Used when the dataset already returned matches. Replace `{count}`, `{query}`, `{names}`.
pub const ADDITIONAL_REMEDIES_TEMPLATE: &str = "The remedy database has {count} remedies for \"{query}\". \
    Suggest 3-5 ADDITIONAL complementary home remedies that are NOT in this list: {names}.";

/// Used when the dataset found nothing. Replace `{query}`.
pub const FRESH_REMEDIES_TEMPLATE: &str = "Suggest 5-7 home remedies for \"{query}\".";

/// Output schema appended to both remedy templates. Replace `{query}`.
pub const REMEDY_SCHEMA: &str = r#"
Return a JSON array, each item in this EXACT shape:
[
  {
    "name": "Ingredient or remedy name",
    "healthIssue": "{query}",
    "remedy": "Preparation and usage instructions with quantities and frequency",
    "yogasan": "A yoga pose with brief instructions",
    "acupressure": "A pressure point and its location",
    "benefits": "Key benefit in one sentence",
    "precautions": "Warnings or who should avoid it",
    "duration": "How long to use it"
  }
]"#;

pub const CHAT_SYSTEM: &str = "You are a knowledgeable wellness and natural remedies consultant. \
    Offer general wellness information and traditional remedy suggestions. \
    Never provide medical diagnoses. Never recommend stopping or replacing prescription medication. \
    For emergency symptoms always direct the user to emergency services. \
    Avoid absolute claims such as \"this will cure\"; prefer \"may help with\". \
    Include safety precautions for any remedy you suggest. \
    Recommend consulting a healthcare professional for chronic or serious conditions.";

pub fn insights_system() -> String {
    format!(
        "You are a holistic wellness assistant. Analyze the user's saved remedies and \
        search history and give personalized, actionable insights. {SAFETY_INSTRUCTION} {JSON_ONLY_SYSTEM}"
    )
}

/// Replace `{user_data}` with the JSON summary of the user's activity.
pub const INSIGHTS_PROMPT_TEMPLATE: &str = r#"Analyze this user's wellness data:

{user_data}

Return a JSON object in this EXACT shape:
{
  "healthStats": {"stress": "65%", "sleepImbalance": "40%", "fatigue": "55%", "digestion": "70%", "immunity": "60%"},
  "analysis": "Brief personalized analysis",
  "recommendations": {
    "homeRemedies": [{"name": "", "description": "", "benefit": ""}],
    "yogaPoses": [{"name": "", "duration": "", "benefit": ""}],
    "acupressure": [{"name": "", "location": "", "technique": ""}],
    "diet": {"eat": [], "avoid": []},
    "lifestyle": [{"tip": "", "reason": ""}],
    "meditation": [{"name": "", "duration": "", "instructions": ""}]
  },
  "weeklyPlan": [{"day": "Monday", "morning": "", "evening": "", "focus": ""}]
}"#;

pub const SYMPTOM_INSIGHT_CONTEXT: &str = "Wellness insights based on symptom history";

/// Replace `{total}`, `{recent}`, `{frequency}` and `{severity}`.
pub const SYMPTOM_INSIGHT_TEMPLATE: &str = "Based on the user's symptom tracking history, provide comprehensive wellness insights.

## Symptom History Overview:
- Total entries: {total}
- Recent symptoms (last 5 entries): {recent}
- Symptom frequency: {frequency}
- Severity distribution: {severity}

Please provide:

## Current Health Assessment
Analyze the overall patterns and current health state based on the symptom history.

## Key Observations
Identify any recurring patterns, concerning trends, or areas that need attention.

## Present Recommendations
What should the user focus on right now? Include home remedies, lifestyle changes and self-care tips.

## Future Health Outlook
What should the user be mindful of in the coming weeks, and which preventive measures would help?

## Holistic Wellness Plan
A brief personalized plan covering diet, exercise, stress management and sleep.

Keep the response helpful, actionable, and encouraging.";
