use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::SibylError;
use crate::handlers::{optional, require};
use crate::router::SibylState;
use crate::service::AskRequest;

const DEFAULT_PROVIDER: &str = "openai";

#[derive(Deserialize)]
pub struct AskBody {
    question: Option<String>,
    webpage_content: Option<String>,
    provider: Option<String>,
    model: Option<String>,
    user_id: Option<String>,
}

#[derive(Serialize)]
pub struct AskResponse {
    answer: String,
}

pub async fn ask(
    State(state): State<SibylState>,
    Json(body): Json<AskBody>,
) -> Result<Json<AskResponse>, SibylError> {
    let question = require(body.question, "question")?;
    let context = require(body.webpage_content, "webpage_content")?;
    let provider = optional(body.provider).unwrap_or_else(|| DEFAULT_PROVIDER.to_string());

    let answer = state
        .questions
        .ask(AskRequest {
            question,
            context,
            provider,
            model: optional(body.model),
            user_id: optional(body.user_id),
        })
        .await?;

    Ok(Json(AskResponse { answer }))
}
