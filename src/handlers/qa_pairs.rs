use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SibylError;
use crate::handlers::{optional, require};
use crate::router::SibylState;

#[derive(Deserialize)]
pub struct SaveBody {
    webpage_url: Option<String>,
    question: Option<String>,
    answer: Option<String>,
    context: Option<String>,
    user_id: Option<String>,
}

#[derive(Serialize)]
pub struct SaveResponse {
    success: bool,
    id: i64,
}

pub async fn save(
    State(state): State<SibylState>,
    Json(body): Json<SaveBody>,
) -> Result<Json<SaveResponse>, SibylError> {
    let webpage_url = require(body.webpage_url, "webpage_url")?;
    let question = require(body.question, "question")?;
    let answer = require(body.answer, "answer")?;

    let context = optional(body.context);
    let created_by = optional(body.user_id);
    let id = state
        .qa_pairs
        .insert(
            &webpage_url,
            &question,
            &answer,
            context.as_deref(),
            created_by.as_deref(),
        )
        .await?;

    Ok(Json(SaveResponse { success: true, id }))
}

#[derive(Deserialize)]
pub struct SavedParams {
    webpage_url: Option<String>,
}

#[derive(Serialize)]
pub struct QaPairEntry {
    id: i64,
    question: String,
    answer: String,
    created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct SavedResponse {
    qa_pairs: Vec<QaPairEntry>,
}

pub async fn saved(
    State(state): State<SibylState>,
    Query(params): Query<SavedParams>,
) -> Result<Json<SavedResponse>, SibylError> {
    let webpage_url = require(params.webpage_url, "webpage_url")?;

    let qa_pairs = state
        .qa_pairs
        .list_by_url(&webpage_url)
        .await?
        .into_iter()
        .map(|record| QaPairEntry {
            id: record.id,
            question: record.question,
            answer: record.answer,
            created_at: record.created_at,
        })
        .collect();

    Ok(Json(SavedResponse { qa_pairs }))
}

#[derive(Deserialize)]
pub struct DeleteBody {
    id: Option<i64>,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    success: bool,
}

pub async fn delete(
    State(state): State<SibylState>,
    Json(body): Json<DeleteBody>,
) -> Result<Json<DeleteResponse>, SibylError> {
    let id = body.id.ok_or(SibylError::MissingField("id"))?;
    state.qa_pairs.delete(id).await?;
    Ok(Json(DeleteResponse { success: true }))
}
