// Shared prompt fragments. Each feature that calls the LLM keeps its own
// prompts next to it (see assistant::prompts); this file holds cross-cutting pieces.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every prompt that produces health advice.
pub const SAFETY_INSTRUCTION: &str = "\
    Never diagnose, never give prescription-drug dosages, and never suggest \
    stopping prescribed medication. Recommend a healthcare professional for \
    serious or persistent conditions.";
