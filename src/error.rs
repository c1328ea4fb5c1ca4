use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

use crate::config::Provider;

#[derive(Debug, ThisError)]
pub enum SibylError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unsupported provider: {0}. Must be one of: openai, anthropic")]
    UnsupportedProvider(String),

    #[error("Unsupported model for {provider}: {model}")]
    UnsupportedModel { provider: Provider, model: String },

    #[error("No valid API key found for provider: {0}")]
    NoValidCredential(Provider),

    #[error("Failed to initialize provider: {0}")]
    AdapterInit(Provider),

    #[error("AI backend call failed: {0}")]
    ExternalCall(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),
}

impl IntoResponse for SibylError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            SibylError::MissingField(_)
            | SibylError::UnsupportedProvider(_)
            | SibylError::UnsupportedModel { .. }
            | SibylError::NoValidCredential(_)
            | SibylError::ExternalCall(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            SibylError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            SibylError::AdapterInit(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            SibylError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred.".to_string(),
            ),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
