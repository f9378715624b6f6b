//! Keyword and pattern based content filtering for everything relayed to the LLM.
//!
//! Inbound: `screen` rejects sensitive topics and requests that bait the model
//! into miracle-cure claims. Outbound: `sanitize` rewrites dosing and
//! stop-medication instructions that slipped through.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Lowercase substrings that route the user to a professional instead of the model.
const SENSITIVE_TOPICS: &[&str] = &[
    "medical diagnosis",
    "prescription medication",
    "emergency medical",
    "drug interactions",
    "suicide",
    "self-harm",
    "illegal activities",
    "personal medical records",
    "drug prescriptions",
    "overdose",
    "abortion",
    "euthanasia",
    "controlled substances",
    "mental health crisis",
    "violence",
    "weapons",
    "credit card",
    "social security",
    "password",
    "bank account",
    "private key",
    "api key",
    "secret key",
];

static HALLUCINATION_RISK: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)cure\s+(cancer|aids|hiv|diabetes)",
        r"(?i)100%\s*(effective|guaranteed|cure)",
        r"(?i)miracle\s*(cure|treatment|remedy)",
        r"(?i)replace\s*(medication|medicine|doctor)",
        r"(?i)stop\s*taking\s*(medication|medicine)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid hallucination-risk pattern"))
    .collect()
});

static HARMFUL_ADVICE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)take\s+\d+\s*(mg|ml|pills?|tablets?|capsules?)\s+of",
        r"(?i)inject\s+",
        r"(?i)stop\s+taking\s+your\s+(medication|medicine|prescription)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid harmful-advice pattern"))
    .collect()
});

const SANITIZED_REPLACEMENT: &str = "[consult a healthcare provider about] ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    SensitiveTopic,
    HallucinationPrevention,
}

impl BlockReason {
    /// Canned reply returned instead of an LLM answer.
    pub fn reply(self) -> &'static str {
        match self {
            BlockReason::SensitiveTopic => {
                "I appreciate your trust, but this topic requires professional expertise \
                that I cannot provide. Please consult a qualified healthcare provider, \
                pharmacist, or other appropriate professional for guidance on your situation."
            }
            BlockReason::HallucinationPrevention => {
                "Natural remedies can support overall wellness, but I cannot make claims \
                about curing serious medical conditions. Those need diagnosis and treatment \
                from a qualified healthcare provider. I'm happy to suggest supportive \
                wellness practices that complement professional care."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screening {
    Allowed,
    Blocked(BlockReason),
}

/// Checks an inbound message. Sensitive topics win over hallucination risk.
pub fn screen(message: &str) -> Screening {
    let lower = message.to_lowercase();
    if SENSITIVE_TOPICS.iter().any(|topic| lower.contains(topic)) {
        return Screening::Blocked(BlockReason::SensitiveTopic);
    }
    if HALLUCINATION_RISK.iter().any(|re| re.is_match(message)) {
        return Screening::Blocked(BlockReason::HallucinationPrevention);
    }
    Screening::Allowed
}

/// Rewrites harmful instructions in an outbound reply.
pub fn sanitize(reply: &str) -> String {
    HARMFUL_ADVICE
        .iter()
        .fold(reply.to_string(), |text, re| {
            re.replace_all(&text, SANITIZED_REPLACEMENT).into_owned()
        })
}
