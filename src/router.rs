use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::db::sqlite::{CredentialStore, QaStore, SqlitePool};
use crate::handlers;
use crate::service::QuestionService;

#[derive(Clone)]
pub struct SibylState {
    pub credentials: CredentialStore,
    pub qa_pairs: QaStore,
    pub questions: QuestionService,
}

impl SibylState {
    /// Wire the stores and the question service over one pool and one shared
    /// outbound HTTP client.
    pub fn new(pool: SqlitePool, client: reqwest::Client) -> Self {
        let credentials = CredentialStore::new(pool.clone());
        let qa_pairs = QaStore::new(pool);
        let questions = QuestionService::new(Arc::new(credentials.clone()), client);
        Self {
            credentials,
            qa_pairs,
            questions,
        }
    }
}

pub fn sibyl_router(state: SibylState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ask", post(handlers::ask::ask))
        .route("/save", post(handlers::qa_pairs::save))
        .route("/saved", get(handlers::qa_pairs::saved))
        .route("/delete", post(handlers::qa_pairs::delete))
        .route("/update_api_key", post(handlers::api_keys::update))
        .route("/get_api_key", get(handlers::api_keys::get))
        // Browser-extension callers come from arbitrary origins.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index() -> Json<Value> {
    Json(json!({
        "status": "running",
        "endpoints": [
            { "path": "/ask", "method": "POST", "description": "Ask a question about webpage content" },
            { "path": "/save", "method": "POST", "description": "Save a Q&A pair" },
            { "path": "/saved", "method": "GET", "description": "Get saved Q&A pairs for a webpage" },
            { "path": "/delete", "method": "POST", "description": "Delete a saved Q&A pair" },
            { "path": "/update_api_key", "method": "POST", "description": "Update a provider API key" },
            { "path": "/get_api_key", "method": "GET", "description": "Get the stored API key for a provider" },
        ]
    }))
}
