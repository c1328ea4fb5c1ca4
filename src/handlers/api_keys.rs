use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::config::Provider;
use crate::error::SibylError;
use crate::handlers::{optional, require};
use crate::router::SibylState;

#[derive(Deserialize)]
pub struct UpdateKeyBody {
    key: Option<String>,
    provider: Option<String>,
    model: Option<String>,
    user_id: Option<String>,
}

#[derive(Serialize)]
pub struct UpdateKeyResponse {
    success: bool,
    id: i64,
}

pub async fn update(
    State(state): State<SibylState>,
    Json(body): Json<UpdateKeyBody>,
) -> Result<Json<UpdateKeyResponse>, SibylError> {
    let key = require(body.key, "key")?;
    let provider_raw = require(body.provider, "provider")?;
    let model = require(body.model, "model")?;

    let provider =
        Provider::parse(&provider_raw).ok_or(SibylError::UnsupportedProvider(provider_raw))?;
    if !provider.supports_model(&model) {
        return Err(SibylError::UnsupportedModel { provider, model });
    }

    let user_id = optional(body.user_id);
    let record = state
        .credentials
        .upsert_invalidating_prior(provider, user_id.as_deref(), &key, &model)
        .await?;

    Ok(Json(UpdateKeyResponse {
        success: true,
        id: record.id,
    }))
}

#[derive(Deserialize)]
pub struct GetKeyParams {
    provider: Option<String>,
    user_id: Option<String>,
}

#[derive(Serialize)]
pub struct ApiKeyResponse {
    key: String,
    provider: &'static str,
    model: String,
    user_id: Option<String>,
}

pub async fn get(
    State(state): State<SibylState>,
    Query(params): Query<GetKeyParams>,
) -> Result<Json<ApiKeyResponse>, SibylError> {
    let provider_raw = require(params.provider, "provider")?;
    let provider =
        Provider::parse(&provider_raw).ok_or(SibylError::UnsupportedProvider(provider_raw))?;

    let user_id = optional(params.user_id);
    let record = state
        .credentials
        .find_valid(provider, user_id.as_deref())
        .await?
        .ok_or_else(|| {
            SibylError::NotFound(format!("No valid API key found for provider: {provider}"))
        })?;

    Ok(Json(ApiKeyResponse {
        key: record.key,
        provider: record.provider.as_str(),
        model: record.model,
        user_id: record.user_id,
    }))
}
