use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM rate limited")]
    RateLimited,

    #[error("LLM credits exhausted")]
    PaymentRequired,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::RateLimited { .. } | LlmError::Api { status: 429, .. } => {
                AppError::RateLimited
            }
            LlmError::Api { status: 402, .. } => AppError::PaymentRequired,
            other => AppError::Llm(other.to_string()),
        }
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "A database error occurred".to_string(),
            ),
            AppError::Llm(_) => (
                StatusCode::BAD_GATEWAY,
                "LLM_ERROR",
                "An AI processing error occurred".to_string(),
            ),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "The AI service is busy. Please try again in a moment.".to_string(),
            ),
            AppError::PaymentRequired => (
                StatusCode::PAYMENT_REQUIRED,
                "PAYMENT_REQUIRED",
                "AI usage limit reached. Please try again later.".to_string(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal server error occurred".to_string(),
            ),
        }
    }

    /// The message a client sees for this error. Never carries upstream detail.
    pub fn public_message(&self) -> String {
        self.parts().2
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(e) => tracing::error!("Database error: {e}"),
            AppError::Llm(msg) => tracing::error!("LLM error: {msg}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            _ => {}
        }

        let (status, code, message) = self.parts();
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(e: AppError) -> StatusCode {
        e.into_response().status()
    }

    #[test]
    fn test_llm_status_mapping() {
        let rate_limited: AppError = LlmError::Api {
            status: 429,
            message: "slow down".into(),
        }
        .into();
        assert_eq!(status(rate_limited), StatusCode::TOO_MANY_REQUESTS);

        let exhausted: AppError = LlmError::RateLimited { retries: 3 }.into();
        assert!(matches!(exhausted, AppError::RateLimited));

        let payment: AppError = LlmError::Api {
            status: 402,
            message: "no credits".into(),
        }
        .into();
        assert_eq!(status(payment), StatusCode::PAYMENT_REQUIRED);

        let other: AppError = LlmError::EmptyContent.into();
        assert_eq!(status(other), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_public_message_hides_upstream_detail() {
        let err = AppError::Llm("upstream said: secret".into());
        assert!(!err.public_message().contains("secret"));
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = AppError::Conflict("Remedy already saved".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "CONFLICT");
        assert_eq!(body["error"]["message"], "Remedy already saved");
    }
}
