use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assistant::guardrails::{sanitize, screen, BlockReason, Screening};
use crate::assistant::prompts::{CHAT_SAMPLING, CHAT_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::{ChatMessage, LlmClient, Role, MODEL};

const EMPTY_REPLY: &str =
    "I'm sorry, I could not come up with an answer just now. Please try rephrasing your question.";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<BlockReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'static str>,
}

impl ChatReply {
    fn blocked(reason: BlockReason) -> Self {
        Self {
            response: reason.reply().to_string(),
            blocked: true,
            reason: Some(reason),
            model: None,
        }
    }
}

/// Screens the latest user turn, then relays the conversation to the LLM.
pub async fn relay_chat(llm: &LlmClient, request: &ChatRequest) -> Result<ChatReply, AppError> {
    let latest = request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .ok_or_else(|| AppError::Validation("messages must include a user message".to_string()))?;

    if latest.content.trim().is_empty() {
        return Err(AppError::Validation(
            "user message cannot be empty".to_string(),
        ));
    }

    if let Screening::Blocked(reason) = screen(&latest.content) {
        info!("Blocked chat message ({reason:?})");
        return Ok(ChatReply::blocked(reason));
    }

    let system = system_prompt(request.context.as_deref());
    let response = llm.call(&system, &request.messages, CHAT_SAMPLING).await?;
    let text = response
        .text()
        .map(sanitize)
        .unwrap_or_else(|| EMPTY_REPLY.to_string());

    Ok(ChatReply {
        response: text,
        blocked: false,
        reason: None,
        model: Some(MODEL),
    })
}

fn system_prompt(context: Option<&str>) -> String {
    match context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(context) => format!("{CHAT_SYSTEM}\n\nAdditional Context: {context}"),
        None => CHAT_SYSTEM.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_client() -> LlmClient {
        LlmClient::new("unused".into())
            .unwrap()
            .with_endpoint("http://127.0.0.1:9/unused")
    }

    #[tokio::test]
    async fn test_requires_a_user_message() {
        let request = ChatRequest {
            messages: vec![ChatMessage {
                role: Role::Assistant,
                content: "Hello!".into(),
            }],
            context: None,
        };
        let result = relay_chat(&offline_client(), &request).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_latest_user_message_is_screened() {
        let request = ChatRequest {
            messages: vec![
                ChatMessage::user("What helps with sleep?"),
                ChatMessage {
                    role: Role::Assistant,
                    content: "Chamomile tea may help.".into(),
                },
                ChatMessage::user("Is there a miracle cure for insomnia?"),
            ],
            context: None,
        };
        let reply = relay_chat(&offline_client(), &request).await.unwrap();
        assert!(reply.blocked);
        assert_eq!(reply.reason, Some(BlockReason::HallucinationPrevention));
        assert_eq!(
            reply.response,
            BlockReason::HallucinationPrevention.reply()
        );
    }

    #[test]
    fn test_system_prompt_appends_context() {
        assert_eq!(system_prompt(None), CHAT_SYSTEM);
        assert_eq!(system_prompt(Some("   ")), CHAT_SYSTEM);
        let with_context = system_prompt(Some("User is vegan"));
        assert!(with_context.ends_with("Additional Context: User is vegan"));
    }
}
