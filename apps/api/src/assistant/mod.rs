// AI relay: every request is screened by guardrails before it reaches the LLM.
// All LLM calls go through llm_client.

pub mod cache;
pub mod chat;
pub mod generator;
pub mod guardrails;
pub mod handlers;
pub mod insights;
pub mod prompts;
